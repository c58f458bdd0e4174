// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration
//!
//! CPU-only ONNX inference for text detection and per-language recognition.
//!
//! Components:
//! - `preprocessing` - Tensor preparation and region cropping
//! - `detection` - Text region detection
//! - `recognition` - Text recognition and CTC decoding
//! - `engine` - `OcrEngine` implementation and factory

pub mod detection;
pub mod engine;
pub mod preprocessing;
pub mod recognition;

pub use detection::{DetectedBox, DetectionModel};
pub use engine::{ModelPaths, PaddleOcrEngine, PaddleOcrFactory};
pub use recognition::{Dictionary, RecognitionModel, RecognizedText};

use anyhow::{Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;

/// Threads per ONNX session
const INTRA_THREADS: usize = 4;

/// Open an ONNX model on the CPU provider, returning the session and the
/// name of its first input
pub(crate) fn open_cpu_session(model_path: &Path) -> Result<(Session, String)> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(INTRA_THREADS)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to read ONNX model {}", model_path.display()))?;

    let input_name = session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .unwrap_or_else(|| "x".to_string());

    Ok((session, input_name))
}
