//! Cloudinary storage implementation
//!
//! Signed upload and destroy calls against the Cloudinary HTTP API. The API
//! base URL comes from `CloudinaryConfig` so tests can point the client at
//! a mock server.

use crate::public_id;
use crate::traits::{MediaStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use shopmedia_core::config::CloudinaryConfig;
use shopmedia_core::models::UploadResult;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Cloudinary-backed storage.
#[derive(Clone)]
pub struct CloudinaryStorage {
    client: reqwest::Client,
    config: CloudinaryConfig,
    request_timeout: Duration,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig, request_timeout: Duration) -> StorageResult<Self> {
        if config.cloud_name.is_empty() {
            return Err(StorageError::Config("cloud_name must be set".to_string()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;
        Ok(Self {
            client,
            config,
            request_timeout,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            .to_string()
    }

    fn map_send_error(e: reqwest::Error) -> StorageError {
        if e.is_timeout() {
            StorageError::Timeout
        } else {
            StorageError::Transport(e.to_string())
        }
    }

    /// Extract the backend's error message from a non-2xx response body.
    async fn rejection(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .map(|detail| detail.message)
            .unwrap_or_else(|| format!("HTTP {}", status));
        StorageError::BackendRejected(message)
    }
}

#[async_trait]
impl MediaStorage for CloudinaryStorage {
    async fn upload(
        &self,
        folder: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResult> {
        let timestamp = Self::timestamp();
        let signature = api_signature(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let file_part = multipart::Part::bytes(data.to_vec())
            .file_name("image")
            .mime_str(content_type)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        let form = multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("folder", folder.to_string())
            .part("file", file_part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let public_url = body.secure_url.ok_or_else(|| {
            StorageError::InvalidResponse("upload response missing secure_url".to_string())
        })?;

        tracing::info!(folder = %folder, url = %public_url, "Uploaded image to Cloudinary");
        Ok(UploadResult { public_url })
    }

    async fn delete(&self, public_id: &str) -> StorageResult<()> {
        let timestamp = Self::timestamp();
        let signature = api_signature(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let params = [
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", &timestamp),
            ("signature", &signature),
            ("public_id", public_id),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .timeout(self.request_timeout)
            .form(&params)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        match body.result.as_deref() {
            Some("ok") => Ok(()),
            Some(other) => Err(StorageError::BackendRejected(format!(
                "destroy returned '{}' for {}",
                other, public_id
            ))),
            None => Err(StorageError::InvalidResponse(
                "destroy response missing result".to_string(),
            )),
        }
    }

    fn owns_url(&self, url: &str) -> bool {
        public_id::is_delivery_url(&self.config, url)
    }

    fn public_id_for_url(&self, url: &str) -> Option<String> {
        public_id::parse_public_id(&self.config, url)
    }
}

/// Cloudinary request signature: SHA-1 over the alphabetically sorted
/// `key=value` pairs joined with `&`, with the API secret appended.
fn api_signature(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
