// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text removal request fields

use crate::api::errors::ApiError;
use crate::api::form::{FormData, UploadedFile};
use crate::vision::{LanguageSet, DEFAULT_INPAINT_RADIUS};

/// Parsed /remove-text form
#[derive(Debug, Clone)]
pub struct RemoveTextRequest {
    pub image: UploadedFile,
    pub languages: LanguageSet,
    pub inpaint_radius: u32,
}

impl RemoveTextRequest {
    pub fn from_form(mut form: FormData) -> Result<Self, ApiError> {
        Ok(Self {
            image: form.take_image()?,
            languages: form.languages()?,
            inpaint_radius: form.u32_field("inpaint_radius", DEFAULT_INPAINT_RADIUS)?,
        })
    }
}
