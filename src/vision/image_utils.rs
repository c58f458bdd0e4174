// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading, format detection and encoding

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::error::ServiceError;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image as {format:?}: {reason}")]
    EncodeFailed { format: ImageFormat, reason: String },
}

/// Dimensions and container format of a decoded upload
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Encoded size
    pub size_bytes: usize,
}

/// Decode raw image bytes
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    let (width, height) = (image.width(), image.height());

    Ok((
        image,
        ImageInfo {
            width,
            height,
            format,
            size_bytes: bytes.len(),
        },
    ))
}

/// Read and decode the image at `path`
///
/// Blocking; call from the blocking pool. Any failure (missing file,
/// unknown format, corrupt data) is reported as `ServiceError::Decode`
/// naming the file.
pub fn load_image(path: &Path) -> Result<(DynamicImage, ImageInfo), ServiceError> {
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let decode_error = |reason: String| ServiceError::Decode {
        path: display_name.clone(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| decode_error(e.to_string()))?;
    decode_image_bytes(&bytes).map_err(|e| decode_error(e.to_string()))
}

/// Sniff the container format of `bytes`; only formats we can decode pass
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    image::guess_format(bytes)
        .ok()
        .filter(|format| format.reading_enabled())
        .ok_or(ImageError::UnsupportedFormat)
}

/// Format implied by a file name's extension, if it is one we can write
pub fn format_from_path(path: &Path) -> Option<ImageFormat> {
    ImageFormat::from_path(path)
        .ok()
        .filter(|format| format.writing_enabled())
}

/// MIME type to serve an encoded image with
pub fn mime_type(format: ImageFormat) -> &'static str {
    format.to_mime_type()
}

/// Encode `image` in `format`
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|e| ImageError::EncodeFailed {
            format,
            reason: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}
