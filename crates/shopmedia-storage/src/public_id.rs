//! Delivery-URL recognition and public-id extraction.
//!
//! A Cloudinary delivery URL looks like
//! `https://res.cloudinary.com/{cloud}/image/upload/v{n}/{folder...}/{name}.{ext}`.
//! The public id is everything after the `upload` marker with the version
//! segment skipped and the file extension stripped:
//! `{folder...}/{name}`. Centralized here so the uploader and the batch
//! deleter can never disagree about the layout.

use percent_encoding::percent_decode_str;
use shopmedia_core::config::CloudinaryConfig;

/// Whether `url` is a delivery URL produced by this backend account.
pub fn is_delivery_url(config: &CloudinaryConfig, url: &str) -> bool {
    parse_segments(config, url).is_some()
}

/// Extract the public id from a delivery URL.
///
/// Returns `None` if the URL is not ours or its path does not contain an
/// identifier after the `upload` marker.
pub fn parse_public_id(config: &CloudinaryConfig, url: &str) -> Option<String> {
    let segments = parse_segments(config, url)?;

    // Skip one leading version segment (v<digits>) if present.
    let rest: &[String] = match segments.first() {
        Some(first) if is_version_segment(first) => &segments[1..],
        _ => &segments[..],
    };
    if rest.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = rest.to_vec();
    let last = parts.last_mut()?;
    if let Some(dot) = last.rfind('.') {
        // Only strip a real extension, not a leading dot.
        if dot > 0 {
            last.truncate(dot);
        }
    }
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts.join("/"))
}

/// Validate host + cloud name + upload marker and return the decoded path
/// segments after the marker.
fn parse_segments(config: &CloudinaryConfig, url: &str) -> Option<Vec<String>> {
    let parsed = reqwest::Url::parse(url).ok()?;
    if !parsed
        .host_str()
        .is_some_and(|h| h.eq_ignore_ascii_case(&config.delivery_host))
    {
        return None;
    }

    let segments: Vec<String> = parsed
        .path_segments()?
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();

    let upload_pos = segments.iter().position(|s| s == "upload")?;
    if !segments[..upload_pos].iter().any(|s| s == &config.cloud_name) {
        return None;
    }
    if upload_pos + 1 >= segments.len() {
        return None;
    }
    Some(segments[upload_pos + 1..].to_vec())
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}
