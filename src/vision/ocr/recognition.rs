// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! One model and character dictionary per language. Output is a sequence of
//! per-timestep class probabilities, decoded with greedy CTC.

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::{Array2, ArrayView2, ArrayViewD, Axis, Ix2};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::open_cpu_session;
use super::preprocessing::preprocess_for_recognition;

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean probability of the emitted characters (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// CTC label table: index 0 is the blank token, the last entry is a space
#[derive(Debug, Clone)]
pub struct Dictionary {
    labels: Vec<String>,
}

impl Dictionary {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = vec![String::new()];
        labels.extend(
            lines
                .into_iter()
                .map(|l| l.as_ref().trim_end_matches(['\r', '\n']).to_string())
                .filter(|l| !l.is_empty()),
        );
        labels.push(" ".to_string());
        Self { labels }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary: {}", path.display()))?;
        Ok(Self::from_lines(contents.lines()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.len() <= 2
    }

    /// Greedy CTC decode of a `timesteps x classes` probability matrix
    ///
    /// Repeated classes collapse and blanks are dropped. Classes outside the
    /// dictionary are ignored.
    pub fn decode_ctc(&self, probabilities: ArrayView2<f32>) -> RecognizedText {
        let mut text = String::new();
        let mut total = 0.0f32;
        let mut emitted = 0usize;
        let mut previous = 0usize;

        for row in probabilities.rows() {
            let (index, probability) = row
                .iter()
                .copied()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| {
                    if p > best.1 {
                        (i, p)
                    } else {
                        best
                    }
                });

            if index != 0 && index != previous {
                if let Some(label) = self.labels.get(index) {
                    text.push_str(label);
                    total += probability;
                    emitted += 1;
                }
            }
            previous = index;
        }

        let confidence = if emitted == 0 {
            0.0
        } else {
            (total / emitted as f32).clamp(0.0, 1.0)
        };

        RecognizedText {
            text: text.trim().to_string(),
            confidence,
        }
    }
}

pub struct RecognitionModel {
    language: String,
    session: Mutex<Session>,
    input_name: String,
    dictionary: Dictionary,
}

impl std::fmt::Debug for RecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionModel")
            .field("language", &self.language)
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl RecognitionModel {
    /// Load a language's recognition model and dictionary; blocking
    pub fn load(language: &str, model_path: &Path, dict_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!(
                "OCR recognition model for '{}' not found: {}",
                language,
                model_path.display()
            );
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary for '{}' not found: {}",
                language,
                dict_path.display()
            );
        }

        info!(
            "Loading OCR recognition model for '{}' from {}",
            language,
            model_path.display()
        );

        let dictionary = Dictionary::load(dict_path)?;
        if dictionary.is_empty() {
            anyhow::bail!("OCR character dictionary is empty: {}", dict_path.display());
        }

        let (session, input_name) = open_cpu_session(model_path)
            .with_context(|| format!("Failed to load OCR recognition model for '{}'", language))?;

        debug!(
            "Recognition model '{}' loaded - input: {}, {} labels",
            language,
            input_name,
            dictionary.len()
        );

        Ok(Self {
            language: language.to_string(),
            session: Mutex::new(session),
            input_name,
            dictionary,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Recognize the single text line in `crop`
    pub fn recognize(&self, crop: &DynamicImage) -> Result<RecognizedText> {
        let input = preprocess_for_recognition(crop);

        let probabilities = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("Recognition session lock poisoned"))?;

            let input_value = Value::from_array(input).context("Failed to create input tensor")?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Recognition inference failed")?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            sequence_matrix(output)?
        };

        Ok(self.dictionary.decode_ctc(probabilities.view()))
    }
}

/// Reduce a `[1, T, C]` output to an owned `T x C` matrix
fn sequence_matrix(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let mut view = output;
    while view.ndim() > 2 {
        view = view.index_axis_move(Axis(0), 0);
    }
    view.into_dimensionality::<Ix2>()
        .map(|v| v.to_owned())
        .map_err(|e| anyhow!("Unexpected recognition output shape: {}", e))
}
