//! Bounded fetcher - downloads untrusted remote images under hard limits.
//!
//! One GET per call, no retries. The wall-clock timeout caps the whole
//! request and the byte budget is enforced while streaming, so an
//! oversized or malicious response is aborted mid-transfer instead of
//! buffered unbounded.

use bytes::BytesMut;
use shopmedia_core::config::PipelineConfig;
use shopmedia_core::models::FetchedImage;
use shopmedia_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Could not connect to host: {0}")]
    Unreachable(String),

    #[error("URL returned 404 Not Found: {0}")]
    NotFound(String),

    #[error("URL returned 403 Forbidden: {0}")]
    Forbidden(String),

    #[error("Fetch timed out: {0}")]
    Timeout(String),

    #[error("Response body exceeded the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("URL returned status code: {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unreachable(msg) => AppError::Unreachable(msg),
            FetchError::NotFound(url) => AppError::NotFound(url),
            FetchError::Forbidden(url) => AppError::AccessDenied(url),
            FetchError::Timeout(_) | FetchError::TooLarge { .. } => {
                AppError::Timeout(err.to_string())
            }
            FetchError::Status(_) => AppError::InvalidArgument(err.to_string()),
            FetchError::Transport(msg) => AppError::Internal(msg),
        }
    }
}

pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            max_bytes: config.max_download_bytes,
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        match status.as_u16() {
            404 => return Err(FetchError::NotFound(url.to_string())),
            403 => return Err(FetchError::Forbidden(url.to_string())),
            code if !status.is_success() => return Err(FetchError::Status(code)),
            _ => {}
        }

        let declared_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
            .unwrap_or_default();

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| classify_request_error(url, e))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                tracing::warn!(
                    url = %url,
                    limit = self.max_bytes,
                    "Aborting fetch: response body exceeds byte budget"
                );
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedImage {
            bytes: body.freeze(),
            declared_content_type,
        })
    }
}

fn classify_request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else if e.is_connect() {
        FetchError::Unreachable(url.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
