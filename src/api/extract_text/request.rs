// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction request fields

use crate::api::errors::ApiError;
use crate::api::form::{FormData, UploadedFile};
use crate::vision::LanguageSet;

/// Parsed /extract-text form
#[derive(Debug, Clone)]
pub struct ExtractTextRequest {
    pub image: UploadedFile,
    pub languages: LanguageSet,
}

impl ExtractTextRequest {
    pub fn from_form(mut form: FormData) -> Result<Self, ApiError> {
        Ok(Self {
            image: form.take_image()?,
            languages: form.languages()?,
        })
    }
}
