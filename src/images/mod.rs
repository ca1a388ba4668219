//! Image resolution and normalization.
//!
//! Chapter bodies and book covers reference images by storage-relative
//! path. The resolver turns such a reference into renderer-ready bytes:
//! decode, proportional downscale to a width bound (never upscale),
//! re-encode as RGB JPEG — the one format both renderers embed
//! natively (DOCX media part, PDF DCTDecode XObject).
//!
//! Absence is not an error. Unsafe paths, missing files, and decode
//! failures all resolve to `None`; the distinction between "no image"
//! and a corrupt pipeline lives in the `warn`-level log, not in the
//! caller's control flow. An image failure never aborts an export.

use std::io::Cursor;

use image::ImageFormat;
use image::imageops::FilterType;
use log::warn;

use crate::store::FileStore;

/// Resolved, size-normalized image bytes ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// JPEG-encoded pixel data.
    pub data: Vec<u8>,
    /// Pixel dimensions after normalization.
    pub width: u32,
    pub height: u32,
}

/// Resolves image references against a [`FileStore`].
pub struct ImageResolver<'a> {
    store: &'a dyn FileStore,
}

impl<'a> ImageResolver<'a> {
    pub fn new(store: &'a dyn FileStore) -> Self {
        Self { store }
    }

    /// Resolve an image reference to normalized bytes.
    ///
    /// Returns `None` for unsafe paths, missing/unreadable files, and
    /// undecodable data. On success the image is at most
    /// `max_width_px` wide, downscaled proportionally if needed.
    pub fn resolve(&self, path: &str, max_width_px: u32) -> Option<ImageAsset> {
        let relative = match normalize_reference(path) {
            Some(p) => p,
            None => {
                warn!("image reference {path:?} rejected: absolute or traversal path");
                return None;
            }
        };

        let bytes = match self.store.read(&relative) {
            Some(b) => b,
            None => {
                warn!("image {relative:?} not readable from store");
                return None;
            }
        };

        let decoded = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!("image {relative:?} failed to decode: {e}");
                return None;
            }
        };

        let (w, h) = (decoded.width(), decoded.height());
        let scaled = if w > max_width_px {
            let target_h = ((h as u64 * max_width_px as u64) / w as u64).max(1) as u32;
            decoded.resize_exact(max_width_px, target_h, FilterType::Lanczos3)
        } else {
            decoded
        };

        let rgb = image::DynamicImage::ImageRgb8(scaled.to_rgb8());
        let (width, height) = (rgb.width(), rgb.height());
        let mut out = Cursor::new(Vec::new());
        if let Err(e) = rgb.write_to(&mut out, ImageFormat::Jpeg) {
            warn!("image {relative:?} failed to re-encode: {e}");
            return None;
        }

        Some(ImageAsset {
            data: out.into_inner(),
            width,
            height,
        })
    }
}

/// Normalize an image reference to a storage-relative path.
///
/// The authoring app historically stored upload paths with a leading
/// slash (`/uploads/...`); that prefix is storage-relative and is
/// stripped. Anything still absolute after stripping, or containing a
/// `..` segment, is refused.
fn normalize_reference(path: &str) -> Option<String> {
    let trimmed = path.trim();
    let relative = trimmed
        .strip_prefix('/')
        .or_else(|| trimmed.strip_prefix("./"))
        .unwrap_or(trimmed);

    if relative.is_empty() || std::path::Path::new(relative).is_absolute() {
        return None;
    }
    if relative.split(['/', '\\']).any(|seg| seg == "..") {
        return None;
    }
    Some(relative.to_string())
}

/// Proportionally fit `(width, height)` inside a bounding box without
/// ever scaling up. Used by the renderers to compute display sizes.
pub fn fit_box(width: u32, height: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (box_w, box_h);
    }
    let scale = (box_w as f64 / width as f64)
        .min(box_h as f64 / height as f64)
        .min(1.0);
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}
