// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! The detection network outputs a per-pixel text probability map. Regions
//! are recovered by thresholding the map, grouping connected pixels, scoring
//! each group by its mean probability and expanding the surviving boxes
//! (the network predicts shrunk text kernels).

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::{Array2, ArrayViewD, Axis, Ix2};
use ort::session::Session;
use ort::value::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::open_cpu_session;
use super::preprocessing::{preprocess_for_detection, Letterbox, DET_INPUT_SIZE};
use crate::vision::engine::BoundingPolygon;

/// Probability above which a map pixel counts as text
pub const BINARIZE_THRESHOLD: f32 = 0.3;

/// Minimum mean probability for a region to be kept
pub const BOX_THRESHOLD: f32 = 0.6;

/// Expansion ratio applied to shrunk text kernels
pub const UNCLIP_RATIO: f32 = 1.5;

/// Regions whose shorter side is below this (map pixels) are dropped
pub const MIN_BOX_SIDE: f32 = 3.0;

/// Boxes whose top edges differ by less than this are treated as one line
const LINE_TOLERANCE: i32 = 10;

/// A detected region in original image coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBox {
    pub polygon: BoundingPolygon,
    /// Mean text probability inside the region
    pub score: f32,
}

pub struct DetectionModel {
    session: Mutex<Session>,
    input_name: String,
}

impl std::fmt::Debug for DetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionModel")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl DetectionModel {
    /// Load the detection model (det_model.onnx); blocking
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let (session, input_name) = open_cpu_session(model_path)
            .context("Failed to load OCR detection model")?;
        debug!("Detection model input: {}", input_name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Find text regions in `image`, in reading order
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedBox>> {
        let (input, letterbox) = preprocess_for_detection(image);
        if letterbox.scaled_width == 0 {
            return Ok(Vec::new());
        }

        let probability_map = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("Detection session lock poisoned"))?;

            let input_value = Value::from_array(input).context("Failed to create input tensor")?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            probability_map(output)?
        };

        let boxes = boxes_from_probability_map(&probability_map, &letterbox);
        debug!("Detected {} text regions", boxes.len());
        Ok(boxes)
    }
}

/// Reduce a `[1, 1, H, W]` or `[1, H, W]` output to an owned `H x W` map
fn probability_map(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let mut view = output;
    while view.ndim() > 2 {
        view = view.index_axis_move(Axis(0), 0);
    }
    view.into_dimensionality::<Ix2>()
        .map(|v| v.to_owned())
        .map_err(|e| anyhow!("Unexpected detection output shape: {}", e))
}

/// Turn a probability map into scored, expanded boxes in original coordinates
///
/// The map covers the whole detection input; only the letterboxed area
/// holds image content.
pub fn boxes_from_probability_map(map: &Array2<f32>, letterbox: &Letterbox) -> Vec<DetectedBox> {
    let (map_height, map_width) = map.dim();
    let mut visited = Array2::<bool>::from_elem((map_height, map_width), false);
    let mut boxes = Vec::new();

    // The map may be smaller than the detection input
    let sx = DET_INPUT_SIZE as f32 / map_width as f32;
    let sy = DET_INPUT_SIZE as f32 / map_height as f32;

    for y in 0..map_height {
        for x in 0..map_width {
            if visited[[y, x]] || map[[y, x]] < BINARIZE_THRESHOLD {
                continue;
            }

            let region = collect_region(map, &mut visited, x, y);
            let width = (region.max_x - region.min_x + 1) as f32;
            let height = (region.max_y - region.min_y + 1) as f32;
            if width.min(height) < MIN_BOX_SIDE {
                continue;
            }

            let score = region.score_sum / region.pixels as f32;
            if score < BOX_THRESHOLD {
                continue;
            }

            // Offset distance of the polygon unclip, for a rectangle
            let distance = width * height * UNCLIP_RATIO / (2.0 * (width + height));
            let left = region.min_x as f32 - distance;
            let top = region.min_y as f32 - distance;
            let right = region.max_x as f32 + distance;
            let bottom = region.max_y as f32 + distance;

            let polygon = BoundingPolygon([
                letterbox.map_to_original(left * sx, top * sy),
                letterbox.map_to_original(right * sx, top * sy),
                letterbox.map_to_original(right * sx, bottom * sy),
                letterbox.map_to_original(left * sx, bottom * sy),
            ]);

            boxes.push(DetectedBox {
                polygon,
                score: score.clamp(0.0, 1.0),
            });
        }
    }

    sort_reading_order(&mut boxes);
    boxes
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    pixels: usize,
    score_sum: f32,
}

/// 8-connected flood fill from `(start_x, start_y)` over above-threshold pixels
fn collect_region(
    map: &Array2<f32>,
    visited: &mut Array2<bool>,
    start_x: usize,
    start_y: usize,
) -> Region {
    let (height, width) = map.dim();
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        pixels: 0,
        score_sum: 0.0,
    };

    let mut queue = VecDeque::from([(start_x, start_y)]);
    visited[[start_y, start_x]] = true;

    while let Some((x, y)) = queue.pop_front() {
        region.pixels += 1;
        region.score_sum += map[[y, x]];
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if !visited[[ny, nx]] && map[[ny, nx]] >= BINARIZE_THRESHOLD {
                    visited[[ny, nx]] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    region
}

/// Top-to-bottom, then left-to-right within a line
fn sort_reading_order(boxes: &mut [DetectedBox]) {
    boxes.sort_by_key(|b| {
        let [x, y] = b.polygon.points()[0];
        (y, x)
    });

    // Boxes on the same line may be out of x order after sorting by y
    for i in 0..boxes.len() {
        for j in (0..i).rev() {
            let [x_next, y_next] = boxes[j + 1].polygon.points()[0];
            let [x_prev, y_prev] = boxes[j].polygon.points()[0];
            if (y_next - y_prev).abs() < LINE_TOLERANCE && x_next < x_prev {
                boxes.swap(j, j + 1);
            } else {
                break;
            }
        }
    }
}
