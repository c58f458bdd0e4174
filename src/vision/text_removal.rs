// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text removal: OCR detection, mask, inpaint, write

use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::engine::Detection;
use super::engine_cache::EngineCache;
use super::image_utils::{encode_image, format_from_path, load_image};
use super::inpaint::Inpainter;
use super::languages::LanguageSet;
use super::mask::build_mask;
use crate::error::ServiceError;
use crate::storage::TempFileStore;

/// A written result image
#[derive(Debug, Clone)]
pub struct RemovalOutput {
    /// Absolute path of the processed image
    pub path: PathBuf,
    /// Format the image was written in
    pub format: ImageFormat,
    /// Number of text regions that were masked
    pub regions: usize,
}

pub struct TextRemovalService {
    engines: Arc<EngineCache>,
    inpainter: Arc<dyn Inpainter>,
    store: TempFileStore,
}

impl TextRemovalService {
    pub fn new(engines: Arc<EngineCache>, inpainter: Arc<dyn Inpainter>, store: TempFileStore) -> Self {
        Self {
            engines,
            inpainter,
            store,
        }
    }

    pub fn inpainter_name(&self) -> &str {
        self.inpainter.name()
    }

    /// Remove all detected text from the image at `image_path`
    ///
    /// The result is written to the store's result directory under a name
    /// derived from `image_path`. When nothing is detected the decoded image
    /// is written back without inpainting.
    pub async fn remove_text(
        &self,
        image_path: &Path,
        languages: &LanguageSet,
        inpaint_radius: u32,
    ) -> Result<RemovalOutput, ServiceError> {
        let start = Instant::now();

        let source = image_path.to_path_buf();
        let (image, info) = tokio::task::spawn_blocking(move || load_image(&source))
            .await
            .map_err(|e| ServiceError::Processing(format!("Image decode task failed: {}", e)))??;
        debug!(
            "Decoded {}x{} {:?} image for text removal",
            info.width, info.height, info.format
        );

        let engine = self.engines.get_engine(languages).await?;

        let output_path = self.store.result_path_for(image_path);
        let format = format_from_path(&output_path).unwrap_or(info.format);

        let inpainter = self.inpainter.clone();
        let (encoded, regions) = tokio::task::spawn_blocking(move || {
            let detections = engine.detect(&image).map_err(ServiceError::processing)?;
            let cleaned = clean_image(image, &detections, inpainter.as_ref(), inpaint_radius)?;
            let encoded = encode_image(&cleaned, format)
                .map_err(|e| ServiceError::Processing(e.to_string()))?;
            Ok::<_, ServiceError>((encoded, detections.len()))
        })
        .await
        .map_err(|e| ServiceError::Processing(format!("Text removal task failed: {}", e)))??;

        self.store.persist_result(&output_path, &encoded).await?;

        info!(
            "Removed {} text regions in {}ms -> {}",
            regions,
            start.elapsed().as_millis(),
            output_path.display()
        );

        Ok(RemovalOutput {
            path: output_path,
            format,
            regions,
        })
    }
}

/// Mask every detection and inpaint; a no-op (besides RGB conversion) when
/// there is nothing to remove
fn clean_image(
    image: DynamicImage,
    detections: &[Detection],
    inpainter: &dyn Inpainter,
    radius: u32,
) -> Result<DynamicImage, ServiceError> {
    let rgb = image.to_rgb8();
    if detections.is_empty() {
        debug!("No text detected, skipping inpainting");
        return Ok(DynamicImage::ImageRgb8(rgb));
    }

    let (width, height) = rgb.dimensions();
    let mask = build_mask(width, height, detections);
    let result = inpainter
        .inpaint(&rgb, &mask, radius)
        .map_err(ServiceError::processing)?;

    if result.dimensions() != (width, height) {
        return Err(ServiceError::Processing(format!(
            "Inpainting backend '{}' returned {}x{} for a {}x{} image",
            inpainter.name(),
            result.width(),
            result.height(),
            width,
            height
        )));
    }

    Ok(DynamicImage::ImageRgb8(result))
}
