//! Error types module
//!
//! Every pipeline stage classifies its failures into a closed enum at the
//! point of origin; those stage errors convert into `AppError` so callers
//! get a stable machine code and one specific, actionable message per kind
//! without ever inspecting implementation error text.

/// Unified pipeline error, one variant per caller-facing failure class.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Source unreachable: {0}")]
    Unreachable(String),

    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Storage backend failure: {0}")]
    UpstreamFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the RPC surface.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "invalid-argument",
            AppError::Unreachable(_) => "unavailable",
            AppError::NotFound(_) => "not-found",
            AppError::AccessDenied(_) => "permission-denied",
            AppError::Timeout(_) => "deadline-exceeded",
            AppError::UnsupportedFormat(_) => "invalid-argument",
            AppError::UpstreamFailure(_) => "internal",
            AppError::Internal(_) => "internal",
        }
    }

    /// Client-facing message. Specific enough that an admin knows whether
    /// to retry, pick a different URL, or give up.
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::Unreachable(msg) => {
                format!("Could not reach the image URL: {}", msg)
            }
            AppError::NotFound(msg) => {
                format!("Image not found (HTTP 404): {}", msg)
            }
            AppError::AccessDenied(msg) => {
                format!("Access to the image was denied (HTTP 403): {}", msg)
            }
            AppError::Timeout(msg) => {
                format!("The transfer took too long or was too large: {}", msg)
            }
            AppError::UnsupportedFormat(msg) => {
                format!("The URL does not point to a supported image: {}", msg)
            }
            AppError::UpstreamFailure(_) => "Image storage backend error".to_string(),
            AppError::Internal(_) => "Internal error".to_string(),
        }
    }

    /// Error kind name for logging and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::Unreachable(_) => "Unreachable",
            AppError::NotFound(_) => "NotFound",
            AppError::AccessDenied(_) => "AccessDenied",
            AppError::Timeout(_) => "Timeout",
            AppError::UnsupportedFormat(_) => "UnsupportedFormat",
            AppError::UpstreamFailure(_) => "UpstreamFailure",
            AppError::Internal(_) => "Internal",
        }
    }
}
