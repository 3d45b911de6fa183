//! Image verifier - proves fetched bytes are a real, bounded image.
//!
//! The URL validator upstream is a heuristic pre-filter; this is the
//! authoritative check. The resolved format always comes from the decoder,
//! never from the declared content-type header, so a mislabeled payload
//! cannot smuggle an unsupported format through.

use image::ImageReader;
use shopmedia_core::models::{FetchedImage, SourceFormat, VerifiedImage};
use shopmedia_core::AppError;
use std::io::Cursor;

/// Content types we accept from the remote server. Matched as substrings of
/// the declared header so parameters and vendor prefixes don't break it.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Body is not a decodable image: {0}")]
    NotDecodable(String),

    #[error("Image has missing or zero dimensions")]
    MissingDimensions,

    #[error("Image too large: {width}x{height} exceeds {max}x{max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        AppError::UnsupportedFormat(err.to_string())
    }
}

/// Decodes fetched payloads far enough to confirm format and dimensions.
pub struct ImageVerifier {
    max_dimension: u32,
}

impl ImageVerifier {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn verify(&self, fetched: FetchedImage) -> Result<VerifiedImage, VerificationError> {
        let declared = normalize_content_type(&fetched.declared_content_type);
        if !ALLOWED_CONTENT_TYPES.iter().any(|t| declared.contains(t)) {
            return Err(VerificationError::UnsupportedContentType(
                fetched.declared_content_type.clone(),
            ));
        }

        let reader = ImageReader::new(Cursor::new(fetched.bytes.as_ref()))
            .with_guessed_format()
            .map_err(|e| VerificationError::NotDecodable(e.to_string()))?;

        let format = match reader.format() {
            Some(image::ImageFormat::Jpeg) => SourceFormat::Jpeg,
            Some(image::ImageFormat::Png) => SourceFormat::Png,
            Some(image::ImageFormat::WebP) => SourceFormat::Webp,
            Some(image::ImageFormat::Gif) => SourceFormat::Gif,
            Some(other) => {
                return Err(VerificationError::UnsupportedContentType(format!(
                    "decoded as {:?}",
                    other
                )))
            }
            None => {
                return Err(VerificationError::NotDecodable(
                    "unrecognized image signature".to_string(),
                ))
            }
        };

        let img = reader
            .decode()
            .map_err(|e| VerificationError::NotDecodable(e.to_string()))?;

        let width = img.width();
        let height = img.height();
        if width == 0 || height == 0 {
            return Err(VerificationError::MissingDimensions);
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(VerificationError::TooLarge {
                width,
                height,
                max: self.max_dimension,
            });
        }

        Ok(VerifiedImage {
            bytes: fetched.bytes,
            declared_content_type: fetched.declared_content_type,
            width,
            height,
            format,
        })
    }
}

/// Lowercase and fold the common "jpg" alias into "jpeg".
fn normalize_content_type(content_type: &str) -> String {
    let lowered = content_type.to_lowercase();
    if lowered.contains("image/jpg") {
        lowered.replace("image/jpg", "image/jpeg")
    } else {
        lowered
    }
}
