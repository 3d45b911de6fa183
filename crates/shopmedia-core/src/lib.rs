//! Shopmedia Core Library
//!
//! This crate provides the shared domain models, error taxonomy, and
//! configuration used by the image ingestion pipeline components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{CloudinaryConfig, PipelineConfig};
pub use error::AppError;
pub use models::{
    BatchDeletionReport, DeletionOutcome, FetchedImage, IngestionRequest, OutputFormat,
    SourceFormat, TranscodedImage, UploadResult, VerifiedImage,
};
