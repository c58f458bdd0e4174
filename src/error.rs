// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Domain errors shared by the removal, extraction and speech services
//!
//! Services return `ServiceError`; the HTTP layer translates each variant to a
//! status code and JSON payload (see `api::errors`).

use thiserror::Error;

use crate::tts::SynthesisError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required field is missing, empty or malformed
    #[error("{message}")]
    Validation { field: String, message: String },

    /// The input image could not be read or decoded
    #[error("Could not read image from {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The OCR engine or inpainting backend failed
    #[error("{0}")]
    Processing(String),

    /// The speech synthesizer failed
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Staging or result file I/O failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ServiceError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Wrap an engine/adapter failure, keeping the full context chain
    pub fn processing(err: anyhow::Error) -> Self {
        ServiceError::Processing(format!("{:#}", err))
    }
}
