//! Domain models for the image ingestion pipeline.
//!
//! All intermediate artifacts live for a single pipeline run and are
//! dropped as soon as the next stage has consumed them. The only value
//! that escapes is the public URL in `UploadResult`.

use bytes::Bytes;
use serde::Serialize;

/// One ingestion call. Never persisted.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub source_url: String,
    pub product_id: Option<String>,
    pub is_main_image: bool,
}

/// Raw bytes pulled from the source URL, before any verification.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    /// Content-type header as declared by the remote server, media type
    /// only (parameters stripped). Empty string if the header was absent.
    pub declared_content_type: String,
}

impl FetchedImage {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// Image format as resolved by the decoder, never by the declared header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

/// A fetched payload that decoded as a real image within the dimension caps.
#[derive(Debug, Clone)]
pub struct VerifiedImage {
    pub bytes: Bytes,
    pub declared_content_type: String,
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
}

impl VerifiedImage {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Output containers allowed to reach storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }

}

/// Re-encoded image ready for upload.
#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub bytes: Bytes,
    pub format: OutputFormat,
}

impl TranscodedImage {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// The one artifact handed back to the caller; the public URL doubles as
/// the external identifier used later for deletion.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub public_url: String,
}

/// Outcome of one item in a batch delete.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    pub source_url: String,
    pub deleted: bool,
}

/// Aggregate result of a batch delete. Order-independent: only counts and
/// the (unordered) error strings matter.
#[derive(Debug, Clone, Default)]
pub struct BatchDeletionReport {
    pub attempted: usize,
    pub deleted_count: usize,
    pub errors: Vec<String>,
}
