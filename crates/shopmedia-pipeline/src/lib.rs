//! Shopmedia Pipeline Library
//!
//! The remote image ingestion pipeline and its two caller-facing
//! operations. An ingestion run is a strictly linear state machine:
//! validate the URL, fetch under resource limits, verify the bytes are a
//! real bounded image, transcode for web delivery, upload to storage. Batch
//! deletion is a separate entry point with best-effort, per-item outcomes.
//!
//! Both operations assume the caller has already been authenticated as an
//! admin; this crate never re-derives that.

pub mod deleter;
pub mod fetcher;
pub mod service;
pub mod validator;

pub use deleter::BatchDeleter;
pub use fetcher::{FetchError, Fetcher};
pub use service::{DeleteImagesResponse, FetchImageResponse, ImagePipeline};
pub use validator::ValidationError;
