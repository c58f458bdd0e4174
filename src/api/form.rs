// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Form body extraction
//!
//! Every endpoint accepts `multipart/form-data` (files and text fields) and
//! `application/x-www-form-urlencoded` (text fields only).

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use axum_extra::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;

use super::errors::ApiError;
use crate::vision::LanguageSet;

/// A file part of a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Parsed form fields and files
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        Self {
            fields,
            files: HashMap::new(),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    /// Boolean field; absent means `default`
    pub fn bool_field(&self, name: &str, default: bool) -> Result<bool, ApiError> {
        match self.text(name) {
            None => Ok(default),
            Some(value) => parse_bool(value).ok_or_else(|| {
                ApiError::validation(name, format!("Invalid boolean for '{}': {}", name, value))
            }),
        }
    }

    /// Required `image` file part
    pub fn take_image(&mut self) -> Result<UploadedFile, ApiError> {
        self.take_file("image")
            .ok_or_else(|| ApiError::validation("image", "No image provided"))
    }

    /// Comma-separated `languages` field; absent means English
    pub fn languages(&self) -> Result<LanguageSet, ApiError> {
        match self.text("languages") {
            None => Ok(LanguageSet::default()),
            Some(list) => Ok(LanguageSet::parse(list)?),
        }
    }

    /// Non-negative integer field; absent or blank means `default`
    pub fn u32_field(&self, name: &str, default: u32) -> Result<u32, ApiError> {
        match self.text(name).map(str::trim) {
            None | Some("") => Ok(default),
            Some(value) => value.parse::<u32>().map_err(|_| {
                ApiError::validation(
                    name,
                    format!("Invalid value for '{}': expected a non-negative integer, got {}", name, value),
                )
            }),
        }
    }
}

/// `true/false/1/0/yes/no/on/off`, case-insensitive
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            Ok(FormData::from_fields(fields))
        } else {
            Err(ApiError::InvalidRequest(
                "Expected multipart/form-data or application/x-www-form-urlencoded body".to_string(),
            ))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Multipart error: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read file '{}': {}", name, e))
                })?;
                // Browsers send an empty, unnamed part when no file is chosen
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                debug!("Received file field '{}' ({} bytes)", name, bytes.len());
                form.files.insert(name, UploadedFile { file_name, bytes });
            }
            None => {
                let value = field.text().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
