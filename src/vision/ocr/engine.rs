// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR-backed `OcrEngine`

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::detection::DetectionModel;
use super::preprocessing::crop_region;
use super::recognition::{RecognitionModel, RecognizedText};
use crate::vision::engine::{Detection, OcrEngine, OcrEngineFactory};
use crate::vision::languages::LanguageSet;

/// File layout of a PaddleOCR ONNX model directory
///
/// ```text
/// {root}/det_model.onnx
/// {root}/rec/{lang}/rec_model.onnx
/// {root}/rec/{lang}/dict.txt
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    root: PathBuf,
}

impl ModelPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn detection_model(&self) -> PathBuf {
        self.root.join("det_model.onnx")
    }

    pub fn recognition_model(&self, language: &str) -> PathBuf {
        self.root.join("rec").join(language).join("rec_model.onnx")
    }

    pub fn dictionary(&self, language: &str) -> PathBuf {
        self.root.join("rec").join(language).join("dict.txt")
    }

    /// Fail early, naming every missing file for `languages`
    ///
    /// Files are named relative to the model directory.
    pub fn verify(&self, languages: &LanguageSet) -> Result<()> {
        let mut missing = Vec::new();

        let detection = self.detection_model();
        if !detection.exists() {
            missing.push(detection);
        }
        for language in languages.iter() {
            for path in [self.recognition_model(language), self.dictionary(language)] {
                if !path.exists() {
                    missing.push(path);
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            let list: Vec<String> = missing
                .iter()
                .map(|p| p.strip_prefix(&self.root).unwrap_or(p).display().to_string())
                .collect();
            anyhow::bail!("OCR model files not found: {}", list.join(", "))
        }
    }
}

/// Detection plus one recognizer per language
pub struct PaddleOcrEngine {
    languages: LanguageSet,
    detector: DetectionModel,
    recognizers: Vec<RecognitionModel>,
}

impl PaddleOcrEngine {
    /// Load every model needed for `languages`; blocking
    pub fn load(paths: &ModelPaths, languages: &LanguageSet) -> Result<Self> {
        paths.verify(languages)?;

        let detector = DetectionModel::load(&paths.detection_model())?;
        let recognizers = languages
            .iter()
            .map(|language| {
                RecognitionModel::load(
                    language,
                    &paths.recognition_model(language),
                    &paths.dictionary(language),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            languages: languages.clone(),
            detector,
            recognizers,
        })
    }

    /// Highest-confidence reading among all languages
    fn recognize_best(&self, crop: &DynamicImage) -> Result<Option<RecognizedText>> {
        let mut best: Option<RecognizedText> = None;
        for recognizer in &self.recognizers {
            let candidate = recognizer
                .recognize(crop)
                .with_context(|| format!("Recognition failed for '{}'", recognizer.language()))?;
            if candidate.is_empty() {
                continue;
            }
            if best.as_ref().map_or(true, |b| candidate.confidence > b.confidence) {
                best = Some(candidate);
            }
        }
        Ok(best)
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let start = Instant::now();
        let boxes = self.detector.detect(image)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for detected in boxes {
            let Some(crop) = crop_region(image, &detected.polygon) else {
                continue;
            };
            if let Some(recognized) = self.recognize_best(&crop)? {
                detections.push(Detection::new(
                    detected.polygon,
                    recognized.text,
                    recognized.confidence,
                ));
            }
        }

        debug!(
            "OCR found {} text regions in {}ms ({})",
            detections.len(),
            start.elapsed().as_millis(),
            self.languages
        );
        Ok(detections)
    }
}

/// Builds `PaddleOcrEngine`s from a model directory
#[derive(Debug, Clone)]
pub struct PaddleOcrFactory {
    paths: ModelPaths,
}

impl PaddleOcrFactory {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            paths: ModelPaths::new(model_dir),
        }
    }

    pub fn paths(&self) -> &ModelPaths {
        &self.paths
    }
}

#[async_trait]
impl OcrEngineFactory for PaddleOcrFactory {
    async fn create(&self, languages: &LanguageSet) -> Result<Arc<dyn OcrEngine>> {
        info!(
            "Loading PaddleOCR models from {} for {}",
            self.paths.root().display(),
            languages
        );

        self.paths.verify(languages)?;

        let paths = self.paths.clone();
        let set = languages.clone();
        let engine = tokio::task::spawn_blocking(move || PaddleOcrEngine::load(&paths, &set))
            .await
            .context("OCR model loading task failed")?
            .map_err(|e| {
                // Runtime errors carry absolute model paths; keep those in the log
                warn!("Failed to load OCR models for {}: {:#}", languages, e);
                anyhow!("OCR models for {} could not be loaded", languages)
            })?;

        Ok(Arc::new(engine))
    }
}
