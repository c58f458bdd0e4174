// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine seam
//!
//! The removal and extraction services never talk to a concrete OCR library;
//! they obtain an `OcrEngine` for a language set from the `EngineCache`,
//! which builds engines through an `OcrEngineFactory`.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::languages::LanguageSet;

/// Four-corner quadrilateral around a text region, clockwise from top-left
///
/// Serialized as `[[x, y], [x, y], [x, y], [x, y]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingPolygon(pub [[i32; 2]; 4]);

impl BoundingPolygon {
    /// Axis-aligned rectangle as a polygon
    pub fn from_rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        let right = x + width - 1;
        let bottom = y + height - 1;
        Self([[x, y], [right, y], [right, bottom], [x, bottom]])
    }

    pub fn points(&self) -> &[[i32; 2]; 4] {
        &self.0
    }

    /// Enclosing rectangle as `(min_x, min_y, max_x, max_y)`, inclusive
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        self.0.iter().fold(
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |(min_x, min_y, max_x, max_y), [x, y]| {
                (min_x.min(*x), min_y.min(*y), max_x.max(*x), max_y.max(*y))
            },
        )
    }
}

/// One detected text region
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub polygon: BoundingPolygon,
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
}

impl Detection {
    pub fn new(polygon: BoundingPolygon, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }
}

/// An initialized OCR engine for a fixed language set
///
/// `detect` is blocking (model inference) and is always called from the
/// blocking thread pool.
pub trait OcrEngine: Send + Sync {
    fn languages(&self) -> &LanguageSet;

    /// Detect and recognize all text regions, in engine order
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<Detection>>;
}

/// Builds OCR engines; construction is expensive (model loading)
#[async_trait]
pub trait OcrEngineFactory: Send + Sync {
    async fn create(&self, languages: &LanguageSet) -> anyhow::Result<Arc<dyn OcrEngine>>;
}
