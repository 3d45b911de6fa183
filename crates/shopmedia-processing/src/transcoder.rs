//! Transcoder - normalizes verified images for web delivery.
//!
//! Only three containers ever reach storage: PNG stays PNG, WebP stays
//! WebP, and everything else (JPEG, GIF) is flattened to JPEG. Oversized
//! images are downsized so the long edge fits the configured cap; nothing
//! is ever upscaled.

use anyhow::Result;
use bytes::Bytes;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use shopmedia_core::config::PipelineConfig;
use shopmedia_core::models::{OutputFormat, SourceFormat, TranscodedImage, VerifiedImage};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Failed to decode verified image: {0}")]
    DecodeFailure(String),

    #[error("Failed to encode output image: {0}")]
    EncodeFailure(String),
}

// Transcoding only runs on verified input, so failures here are ours, not
// the caller's.
impl From<TranscodeError> for shopmedia_core::AppError {
    fn from(err: TranscodeError) -> Self {
        shopmedia_core::AppError::Internal(err.to_string())
    }
}

pub struct Transcoder {
    max_long_edge: u32,
    jpeg_quality: u8,
    webp_quality: f32,
}

impl Transcoder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_long_edge: config.max_output_long_edge,
            jpeg_quality: config.jpeg_quality,
            webp_quality: config.webp_quality,
        }
    }

    pub fn transcode(&self, verified: &VerifiedImage) -> Result<TranscodedImage, TranscodeError> {
        let img = ImageReader::new(Cursor::new(verified.bytes.as_ref()))
            .with_guessed_format()
            .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))?
            .decode()
            .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))?;

        let img = if verified.long_edge() > self.max_long_edge {
            tracing::debug!(
                width = verified.width,
                height = verified.height,
                max_long_edge = self.max_long_edge,
                "Downsizing oversized image"
            );
            // resize() fits within the bounding box and keeps aspect ratio
            img.resize(self.max_long_edge, self.max_long_edge, FilterType::Lanczos3)
        } else {
            img
        };

        let format = output_format_for(verified.format);
        let encoded = match format {
            OutputFormat::Png => encode_png(&img),
            OutputFormat::Webp => encode_webp(&img, self.webp_quality),
            OutputFormat::Jpeg => encode_jpeg(&img, self.jpeg_quality),
        }
        .map_err(|e| TranscodeError::EncodeFailure(e.to_string()))?;

        Ok(TranscodedImage {
            bytes: encoded,
            format,
        })
    }
}

/// Output container policy: PNG in, PNG out; WebP in, WebP out; anything
/// else becomes JPEG.
fn output_format_for(source: SourceFormat) -> OutputFormat {
    match source {
        SourceFormat::Png => OutputFormat::Png,
        SourceFormat::Webp => OutputFormat::Webp,
        SourceFormat::Jpeg | SourceFormat::Gif => OutputFormat::Jpeg,
    }
}

fn encode_png(img: &DynamicImage) -> Result<Bytes> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        &mut buffer,
        CompressionType::Best,
        PngFilterType::Adaptive,
    );
    img.write_with_encoder(encoder)?;
    Ok(Bytes::from(buffer))
}

fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Bytes> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let encoder = webp::Encoder::from_rgba(&rgba, width, height);
    let webp_data = encoder.encode(quality);
    Ok(Bytes::copy_from_slice(&webp_data))
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(&rgb)?;
    let jpeg_data = comp.finish()?;

    Ok(Bytes::from(jpeg_data))
}
