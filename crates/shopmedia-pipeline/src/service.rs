//! Pipeline orchestrator and the two caller-facing operations.
//!
//! `fetch_image_from_url` runs the linear ingestion state machine:
//! validate → fetch → verify → transcode → upload. The first failing stage
//! terminates the run with its classified error; no stage is retried and no
//! partial result escapes. `delete_cloudinary_images` is the independent
//! batch-delete entry point.
//!
//! Precondition for both: the caller has already been established as an
//! authenticated admin.

use crate::deleter::BatchDeleter;
use crate::fetcher::Fetcher;
use crate::validator;
use serde::Serialize;
use shopmedia_core::config::PipelineConfig;
use shopmedia_core::models::IngestionRequest;
use shopmedia_core::AppError;
use shopmedia_processing::{ImageVerifier, Transcoder};
use shopmedia_storage::MediaStorage;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchImageResponse {
    pub success: bool,
    pub cloudinary_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImagesResponse {
    pub success: bool,
    pub deleted_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

pub struct ImagePipeline {
    config: PipelineConfig,
    storage: Arc<dyn MediaStorage>,
    fetcher: Fetcher,
    deleter: BatchDeleter,
}

impl ImagePipeline {
    pub fn new(config: PipelineConfig, storage: Arc<dyn MediaStorage>) -> Result<Self, AppError> {
        let fetcher = Fetcher::new(&config)?;
        let deleter = BatchDeleter::new(Arc::clone(&storage));
        Ok(Self {
            config,
            storage,
            fetcher,
            deleter,
        })
    }

    /// Ingest one remote image and return its public storage URL.
    #[tracing::instrument(
        skip(self, request),
        fields(
            url = %request.source_url,
            product_id = ?request.product_id,
            is_main_image = request.is_main_image,
            operation = "fetch_image_from_url"
        )
    )]
    pub async fn fetch_image_from_url(
        &self,
        request: IngestionRequest,
    ) -> Result<FetchImageResponse, AppError> {
        let url = request.source_url.trim().to_string();
        if url.is_empty() {
            return Err(AppError::InvalidArgument(
                "imageUrl parameter is required".to_string(),
            ));
        }

        validator::validate(&url, &self.config.image_host_allowlist)?;

        let fetched = self.fetcher.fetch(&url).await?;
        tracing::debug!(
            bytes = fetched.byte_length(),
            content_type = %fetched.declared_content_type,
            "Fetched remote image"
        );

        // Decode and re-encode are CPU-bound; keep them off the runtime.
        let max_dimension = self.config.max_source_dimension;
        let verified = tokio::task::spawn_blocking(move || {
            ImageVerifier::new(max_dimension).verify(fetched)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Image verification task failed: {}", e)))??;

        let config = self.config.clone();
        let transcoded = tokio::task::spawn_blocking(move || {
            Transcoder::new(&config).transcode(&verified)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Image transcode task failed: {}", e)))??;

        let folder = folder_for_product(request.product_id.as_deref());
        let uploaded = self
            .storage
            .upload(&folder, transcoded.content_type(), transcoded.bytes.clone())
            .await?;

        tracing::info!(
            folder = %folder,
            public_url = %uploaded.public_url,
            "Image ingested from URL"
        );

        Ok(FetchImageResponse {
            success: true,
            cloudinary_url: uploaded.public_url,
        })
    }

    /// Best-effort bulk deletion of previously ingested images.
    ///
    /// The argument is typed as a list; callers deserializing an untyped
    /// payload must reject a missing or non-list `imageUrls` field before
    /// reaching this method. Individual deletion failures never fail the
    /// call; they are reported in `errors`.
    #[tracing::instrument(
        skip(self, image_urls),
        fields(count = image_urls.len(), operation = "delete_cloudinary_images")
    )]
    pub async fn delete_cloudinary_images(
        &self,
        image_urls: Vec<String>,
    ) -> Result<DeleteImagesResponse, AppError> {
        let report = self.deleter.delete_many(&image_urls).await;
        Ok(DeleteImagesResponse {
            success: true,
            deleted_count: report.deleted_count,
            errors: if report.errors.is_empty() {
                None
            } else {
                Some(report.errors)
            },
        })
    }
}

/// Storage folder scheme: per-product when a product id is known, a shared
/// temp folder otherwise.
fn folder_for_product(product_id: Option<&str>) -> String {
    match product_id.map(str::trim) {
        Some(id) if !id.is_empty() => format!("products/{}", id),
        _ => "products/temp".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_scheme() {
        assert_eq!(folder_for_product(Some("p1")), "products/p1");
        assert_eq!(folder_for_product(Some("  p2 ")), "products/p2");
        assert_eq!(folder_for_product(Some("")), "products/temp");
        assert_eq!(folder_for_product(None), "products/temp");
    }

    #[test]
    fn test_response_serialization_shape() {
        let response = FetchImageResponse {
            success: true,
            cloudinary_url: "https://res.cloudinary.com/demo/x.png".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["cloudinaryUrl"].is_string());

        let response = DeleteImagesResponse {
            success: true,
            deleted_count: 2,
            errors: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["deletedCount"], 2);
        assert!(json.get("errors").is_none());
    }
}
