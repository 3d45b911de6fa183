//! Storage abstraction trait
//!
//! The pipeline talks to its storage/CDN backend only through this trait,
//! which keeps the orchestrator and batch deleter testable against a fake
//! backend.

use async_trait::async_trait;
use bytes::Bytes;
use shopmedia_core::models::UploadResult;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend rejected the request: {0}")]
    BackendRejected(String),

    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),

    #[error("Storage request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shopmedia_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Timeout => {
                shopmedia_core::AppError::Timeout("storage upload timed out".to_string())
            }
            StorageError::Config(msg) => shopmedia_core::AppError::Internal(msg),
            other => shopmedia_core::AppError::UpstreamFailure(other.to_string()),
        }
    }
}

/// Storage backend abstraction.
///
/// Uploads land under a caller-chosen folder and yield a public URL; that
/// URL is the only identifier callers ever hold, so the backend must also
/// be able to recognize its own URLs and map them back to deletable object
/// identifiers.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload image bytes under `folder` and return the public URL.
    async fn upload(
        &self,
        folder: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResult>;

    /// Delete a previously uploaded object by its backend identifier.
    async fn delete(&self, public_id: &str) -> StorageResult<()>;

    /// Whether a public URL was produced by this backend.
    fn owns_url(&self, url: &str) -> bool;

    /// Map a public URL back to the backend object identifier, if possible.
    fn public_id_for_url(&self, url: &str) -> Option<String>;
}
