// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for PaddleOCR

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;

use crate::vision::engine::BoundingPolygon;

/// Side of the square detection input
pub const DET_INPUT_SIZE: u32 = 640;

/// Recognition model input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 960;

/// Minimum width for recognition model input
pub const REC_MIN_WIDTH: u32 = 8;

/// Mean values for detection normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for detection normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// How an image was fitted into the detection input
///
/// The image is scaled to fit `DET_INPUT_SIZE` (aspect preserved) and placed
/// at the top-left; the rest of the tensor is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl Letterbox {
    pub fn new(original_width: u32, original_height: u32, target_size: u32) -> Self {
        if original_width == 0 || original_height == 0 {
            return Self {
                scale: 1.0,
                scaled_width: 0,
                scaled_height: 0,
                original_width,
                original_height,
            };
        }

        let scale = (target_size as f32 / original_width as f32)
            .min(target_size as f32 / original_height as f32);
        let scaled_width = ((original_width as f32 * scale).round() as u32).clamp(1, target_size);
        let scaled_height = ((original_height as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            scaled_width,
            scaled_height,
            original_width,
            original_height,
        }
    }

    /// Map a detection-space point back to original pixel coordinates,
    /// clamped into the image
    pub fn map_to_original(&self, x: f32, y: f32) -> [i32; 2] {
        let max_x = self.original_width.saturating_sub(1) as f32;
        let max_y = self.original_height.saturating_sub(1) as f32;
        [
            (x / self.scale).round().clamp(0.0, max_x) as i32,
            (y / self.scale).round().clamp(0.0, max_y) as i32,
        ]
    }
}

/// Build the `[1, 3, 640, 640]` detection tensor
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let letterbox = Letterbox::new(width, height, DET_INPUT_SIZE);
    let size = DET_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    if letterbox.scaled_width == 0 {
        return (tensor, letterbox);
    }

    let resized = image
        .resize_exact(letterbox.scaled_width, letterbox.scaled_height, FilterType::Triangle)
        .to_rgb8();

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    (tensor, letterbox)
}

/// Build the `[1, 3, 48, W]` recognition tensor for one cropped line
///
/// Width follows the crop's aspect ratio within `REC_MIN_WIDTH..=REC_MAX_WIDTH`.
/// Pixels are scaled to `[-1, 1]`.
pub fn preprocess_for_recognition(crop: &DynamicImage) -> Array4<f32> {
    let (width, height) = crop.dimensions();
    let target_width = if height == 0 {
        REC_MIN_WIDTH
    } else {
        ((width as f32 * REC_INPUT_HEIGHT as f32 / height as f32).ceil() as u32)
            .clamp(REC_MIN_WIDTH, REC_MAX_WIDTH)
    };

    let resized = crop
        .resize_exact(target_width, REC_INPUT_HEIGHT, FilterType::Triangle)
        .to_rgb8();

    Array4::from_shape_fn(
        (1, 3, REC_INPUT_HEIGHT as usize, target_width as usize),
        |(_, c, y, x)| {
            let value = resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - 0.5) / 0.5
        },
    )
}

/// Axis-aligned crop around a polygon, clamped to the image
///
/// Returns `None` if the polygon lies entirely outside the image.
pub fn crop_region(image: &DynamicImage, polygon: &BoundingPolygon) -> Option<DynamicImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let (min_x, min_y, max_x, max_y) = polygon.bounds();
    let max_x = max_x.min(width as i32 - 1);
    let max_y = max_y.min(height as i32 - 1);
    let min_x = min_x.max(0);
    let min_y = min_y.max(0);
    if max_x < min_x || max_y < min_y {
        return None;
    }

    Some(image.crop_imm(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}
