// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod error;
pub mod storage;
pub mod tts;
pub mod version;
pub mod vision;

pub use api::{create_router, AppState};
pub use config::NodeConfig;
pub use error::ServiceError;
pub use storage::{RetentionPolicy, StagedUpload, TempFileStore};
pub use tts::{GoogleTts, SpeechService, SpeechSynthesizer, SynthesisError};
pub use vision::{
    EngineCache, LanguageSet, OcrEngine, OcrEngineFactory, TextExtractionService,
    TextRemovalService,
};
