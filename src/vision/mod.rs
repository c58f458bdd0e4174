// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image text removal and extraction
//!
//! This module provides:
//! - OCR engines (PaddleOCR via ONNX Runtime) cached per language set
//! - Inpainting-based text removal
//! - Text extraction with positions
//!
//! All model inference runs on the CPU in the blocking thread pool.

pub mod engine;
pub mod engine_cache;
pub mod image_utils;
pub mod inpaint;
pub mod languages;
pub mod mask;
pub mod ocr;
pub mod text_extraction;
pub mod text_removal;

pub use engine::{BoundingPolygon, Detection, OcrEngine, OcrEngineFactory};
pub use engine_cache::{EngineCache, DEFAULT_ENGINE_CACHE_CAPACITY};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use inpaint::{default_inpainter, Inpainter, DEFAULT_INPAINT_RADIUS};
pub use languages::LanguageSet;
pub use mask::build_mask;
pub use text_extraction::{ExtractionResult, TextExtractionService};
pub use text_removal::{RemovalOutput, TextRemovalService};
