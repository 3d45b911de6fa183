//! Shopmedia Storage Library
//!
//! Storage abstraction for the image ingestion pipeline: the `MediaStorage`
//! trait plus the Cloudinary HTTP implementation. The trait is the seam the
//! pipeline is tested against; everything backend-specific (request
//! signing, delivery-URL shapes, public-id layout) stays in this crate.

pub mod cloudinary;
pub(crate) mod public_id;
pub mod traits;

// Re-export commonly used types
pub use cloudinary::CloudinaryStorage;
pub use traits::{MediaStorage, StorageError, StorageResult};
