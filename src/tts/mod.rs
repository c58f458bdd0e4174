// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text-to-speech
//!
//! Synthesis itself is delegated to a `SpeechSynthesizer`; `SpeechService`
//! only validates input and enforces the "non-empty MP3" contract.

pub mod google;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::ServiceError;

pub use google::GoogleTts;

/// MIME type of synthesized audio
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Suggested download name for synthesized audio
pub const AUDIO_FILE_NAME: &str = "speech.mp3";

/// Speech synthesis errors
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("No text to speak")]
    EmptyText,

    #[error("Speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Speech service returned HTTP {status} for language '{language}'")]
    Status { status: u16, language: String },

    #[error("No audio in speech response for language '{language}'")]
    NoAudio { language: String },

    #[error("Invalid audio payload: {0}")]
    InvalidAudio(#[from] base64::DecodeError),
}

/// Trait for text-to-speech providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` as MP3 audio; `language` is passed through unvalidated
    async fn synthesize(&self, text: &str, language: &str, slow: bool)
        -> Result<Bytes, SynthesisError>;
}

/// Validating front for a `SpeechSynthesizer`
#[derive(Clone)]
pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SpeechService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Synthesize speech, buffering the whole MP3 payload
    ///
    /// # Errors
    /// - `ServiceError::Validation` if `text` is missing or blank (no synthesis call is made)
    /// - `ServiceError::Synthesis` if the synthesizer fails or returns no audio
    pub async fn synthesize(
        &self,
        text: Option<&str>,
        language: &str,
        slow: bool,
    ) -> Result<Bytes, ServiceError> {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::validation("text", "No text provided"))?;

        info!(
            "Synthesizing {} chars of speech (language={}, slow={})",
            text.chars().count(),
            language,
            slow
        );

        let audio = self.synthesizer.synthesize(text, language, slow).await?;
        if audio.is_empty() {
            return Err(SynthesisError::NoAudio {
                language: language.to_string(),
            }
            .into());
        }

        debug!("Synthesized {} bytes of audio", audio.len());
        Ok(audio)
    }
}
