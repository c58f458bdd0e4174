// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction endpoint handler

use axum::extract::State;
use axum::Json;
use tracing::info;

use super::request::ExtractTextRequest;
use super::response::ExtractTextResponse;
use crate::api::errors::ApiError;
use crate::api::form::FormData;
use crate::api::http_server::AppState;

/// POST /extract-text - Extract text from an image
///
/// # Request (multipart form)
/// - `image`: Image file (required)
/// - `languages`: Comma-separated OCR languages - defaults to "en"
///
/// # Response
/// - `text`: Recognized texts in detection order
/// - `full_text`: Texts joined by spaces
/// - `detailed_results`: `{text, confidence, bounding_box}` per region
///
/// # Errors
/// - 400 Bad Request: missing image or invalid languages
/// - 500 Internal Server Error: unreadable image or OCR failure
pub async fn extract_text_handler(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    let request = ExtractTextRequest::from_form(form)?;

    let upload = state
        .store
        .stage(&request.image.file_name, &request.image.bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to stage upload: {}", e)))?;

    info!(
        "Processing image {} for text extraction (languages={})",
        upload.original_name(),
        request.languages
    );

    let result = state
        .extraction
        .extract_text(upload.path(), &request.languages)
        .await?;
    upload.discard().await;

    Ok(Json(ExtractTextResponse::from(result)))
}
