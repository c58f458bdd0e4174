// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction response types

use serde::{Deserialize, Serialize};

use crate::vision::{BoundingPolygon, ExtractionResult};

/// One recognized text region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailedResult {
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Four `[x, y]` corners
    pub bounding_box: BoundingPolygon,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractTextResponse {
    /// Texts in detection order
    pub text: Vec<String>,
    /// Texts joined by single spaces
    pub full_text: String,
    pub detailed_results: Vec<DetailedResult>,
}

impl From<ExtractionResult> for ExtractTextResponse {
    fn from(result: ExtractionResult) -> Self {
        let text = result.texts();
        let full_text = result.full_text();
        let detailed_results = result
            .detections
            .into_iter()
            .map(|d| DetailedResult {
                text: d.text,
                confidence: d.confidence,
                bounding_box: d.polygon,
            })
            .collect();

        Self {
            text,
            full_text,
            detailed_results,
        }
    }
}
