// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech request fields

use crate::api::errors::ApiError;
use crate::api::form::FormData;

const DEFAULT_LANGUAGE: &str = "en";

/// Parsed /speak form
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakRequest {
    /// Text to speak; blank/missing text is rejected by the speech service
    pub text: Option<String>,
    /// Language code, passed to the synthesizer unvalidated
    pub language: String,
    pub slow: bool,
}

impl SpeakRequest {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let language = form
            .text("language")
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();

        Ok(Self {
            text: form.text("text").map(str::to_string),
            language,
            slow: form.bool_field("slow", false)?,
        })
    }
}
