//! URL validator - image-likeness pre-filter.
//!
//! A cheap heuristic applied before any network I/O: a URL passes if it has
//! an image file extension, lives on a known image-hosting domain, or
//! carries an image-word marker in its path or query. It can false-accept
//! and false-reject by design; the verifier's decode is the authoritative
//! check, so the heuristic is deliberately left loose.

use shopmedia_core::AppError;

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tiff", ".svg",
];

const IMAGE_WORD_MARKERS: &[&str] = &["image", "photo", "pic"];

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Image URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    MalformedUrl(String),

    #[error("URL does not look like an image: {0}")]
    NotImageLike(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}

/// Decide whether `url` is plausibly a fetchable image URL.
///
/// Pure function of the input and the configured host allow-list; performs
/// no I/O.
pub fn validate(url: &str, image_host_allowlist: &[String]) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::Empty);
    }

    let parsed =
        reqwest::Url::parse(url).map_err(|_| ValidationError::MalformedUrl(url.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::MalformedUrl(url.to_string()));
    }

    let path = parsed.path().to_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Ok(());
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        let allowed = image_host_allowlist.iter().any(|entry| {
            let entry = entry.to_lowercase();
            host == entry || host.ends_with(&format!(".{}", entry))
        });
        if allowed {
            return Ok(());
        }
    }

    let query = parsed.query().unwrap_or("").to_lowercase();
    if IMAGE_WORD_MARKERS
        .iter()
        .any(|marker| path.contains(marker) || query.contains(marker))
    {
        return Ok(());
    }

    Err(ValidationError::NotImageLike(url.to_string()))
}
