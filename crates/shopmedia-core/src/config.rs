//! Configuration module
//!
//! Explicit configuration structs for the ingestion pipeline and the
//! Cloudinary storage backend. Everything is constructor-injected so the
//! pipeline can run against a fake backend in tests; nothing here is a
//! module-level global.

use std::env;
use std::time::Duration;

const FETCH_TIMEOUT_SECS: u64 = 30;
const UPLOAD_TIMEOUT_SECS: u64 = 60;
const MAX_DOWNLOAD_BYTES: usize = 10 * 1024 * 1024;
const MAX_SOURCE_DIMENSION: u32 = 5000;
const MAX_OUTPUT_LONG_EDGE: u32 = 1920;
const JPEG_QUALITY: u8 = 85;
const WEBP_QUALITY: f32 = 85.0;
const USER_AGENT: &str = "shopmedia-image-ingest/0.1";

/// Hosts accepted by the URL validator's known-image-host heuristic.
/// Subdomains of these hosts are accepted too.
const DEFAULT_IMAGE_HOST_ALLOWLIST: &[&str] = &[
    "imgur.com",
    "unsplash.com",
    "images.unsplash.com",
    "pexels.com",
    "pixabay.com",
    "cloudinary.com",
    "cdn.shopify.com",
];

/// Resource limits and knobs for one ingestion run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub fetch_timeout: Duration,
    pub upload_timeout: Duration,
    pub max_download_bytes: usize,
    pub max_source_dimension: u32,
    pub max_output_long_edge: u32,
    pub jpeg_quality: u8,
    pub webp_quality: f32,
    pub image_host_allowlist: Vec<String>,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(UPLOAD_TIMEOUT_SECS),
            max_download_bytes: MAX_DOWNLOAD_BYTES,
            max_source_dimension: MAX_SOURCE_DIMENSION,
            max_output_long_edge: MAX_OUTPUT_LONG_EDGE,
            jpeg_quality: JPEG_QUALITY,
            webp_quality: WEBP_QUALITY,
            image_host_allowlist: DEFAULT_IMAGE_HOST_ALLOWLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Build a config from `SHOPMEDIA_*` environment variables, falling back
    /// to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_timeout: env_secs("SHOPMEDIA_FETCH_TIMEOUT_SECS", defaults.fetch_timeout),
            upload_timeout: env_secs("SHOPMEDIA_UPLOAD_TIMEOUT_SECS", defaults.upload_timeout),
            max_download_bytes: env_parse(
                "SHOPMEDIA_MAX_DOWNLOAD_BYTES",
                defaults.max_download_bytes,
            ),
            max_source_dimension: env_parse(
                "SHOPMEDIA_MAX_SOURCE_DIMENSION",
                defaults.max_source_dimension,
            ),
            max_output_long_edge: env_parse(
                "SHOPMEDIA_MAX_OUTPUT_LONG_EDGE",
                defaults.max_output_long_edge,
            ),
            jpeg_quality: env_parse("SHOPMEDIA_JPEG_QUALITY", defaults.jpeg_quality),
            webp_quality: env_parse("SHOPMEDIA_WEBP_QUALITY", defaults.webp_quality),
            image_host_allowlist: env::var("SHOPMEDIA_IMAGE_HOST_ALLOWLIST")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.image_host_allowlist),
            user_agent: env::var("SHOPMEDIA_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

/// Cloudinary backend settings.
///
/// `api_base_url` defaults to the real API host and exists so tests can
/// point the client at a mock server. `delivery_host` is the host of the
/// public delivery URLs this account produces, used to recognize our own
/// URLs during batch deletion.
#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub delivery_host: String,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            api_base_url: "https://api.cloudinary.com".to_string(),
            delivery_host: "res.cloudinary.com".to_string(),
        }
    }

    pub fn from_env() -> Option<Self> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok()?;
        let api_key = env::var("CLOUDINARY_API_KEY").ok()?;
        let api_secret = env::var("CLOUDINARY_API_SECRET").ok()?;
        let mut config = Self::new(cloud_name, api_key, api_secret);
        if let Ok(base) = env::var("CLOUDINARY_API_BASE_URL") {
            config.api_base_url = base;
        }
        if let Ok(host) = env::var("CLOUDINARY_DELIVERY_HOST") {
            config.delivery_host = host;
        }
        Some(config)
    }

    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    pub fn with_delivery_host(mut self, host: impl Into<String>) -> Self {
        self.delivery_host = host.into();
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
