// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inpainting mask construction

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use super::engine::{BoundingPolygon, Detection};

/// Mask value marking pixels to reconstruct
pub const MASK_FOREGROUND: u8 = 255;

/// Single-channel mask with every detection polygon filled
///
/// All detections contribute regardless of confidence.
pub fn build_mask(width: u32, height: u32, detections: &[Detection]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for detection in detections {
        fill_polygon(&mut mask, &detection.polygon);
    }
    mask
}

/// Fill one polygon into `mask`
///
/// Repeated vertices are collapsed first; a polygon that collapses to one
/// point marks that pixel, two points mark a line.
pub fn fill_polygon(mask: &mut GrayImage, polygon: &BoundingPolygon) {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(4);
    for [x, y] in polygon.points() {
        let point = Point::new(*x, *y);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    match points.as_slice() {
        [] => {}
        [p] => {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < mask.width() && (p.y as u32) < mask.height() {
                mask.put_pixel(p.x as u32, p.y as u32, Luma([MASK_FOREGROUND]));
            }
        }
        _ => draw_polygon_mut(mask, &points, Luma([MASK_FOREGROUND])),
    }
}
