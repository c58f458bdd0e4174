// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction: OCR detections as text plus positions

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::engine::Detection;
use super::engine_cache::EngineCache;
use super::image_utils::load_image;
use super::languages::LanguageSet;
use crate::error::ServiceError;

/// Everything the OCR engine found in one image, in engine order
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub detections: Vec<Detection>,
}

impl ExtractionResult {
    pub fn texts(&self) -> Vec<String> {
        self.detections.iter().map(|d| d.text.clone()).collect()
    }

    /// All texts joined by single spaces
    pub fn full_text(&self) -> String {
        self.detections
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct TextExtractionService {
    engines: Arc<EngineCache>,
}

impl TextExtractionService {
    pub fn new(engines: Arc<EngineCache>) -> Self {
        Self { engines }
    }

    pub async fn extract_text(
        &self,
        image_path: &Path,
        languages: &LanguageSet,
    ) -> Result<ExtractionResult, ServiceError> {
        let start = Instant::now();

        let source = image_path.to_path_buf();
        let (image, _info) = tokio::task::spawn_blocking(move || load_image(&source))
            .await
            .map_err(|e| ServiceError::Processing(format!("Image decode task failed: {}", e)))??;

        let engine = self.engines.get_engine(languages).await?;

        let detections = tokio::task::spawn_blocking(move || engine.detect(&image))
            .await
            .map_err(|e| ServiceError::Processing(format!("OCR task failed: {}", e)))?
            .map_err(ServiceError::processing)?;

        info!(
            "Extracted {} text regions in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(ExtractionResult { detections })
    }
}
