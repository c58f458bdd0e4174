// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text-to-speech endpoint
//!
//! Provides POST /speak returning MP3 audio.

pub mod handler;
pub mod request;

pub use handler::speak_handler;
pub use request::SpeakRequest;
