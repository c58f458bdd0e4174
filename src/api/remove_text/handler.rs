// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text removal endpoint handler

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::request::RemoveTextRequest;
use crate::api::errors::ApiError;
use crate::api::form::FormData;
use crate::api::http_server::AppState;
use crate::vision::image_utils::mime_type;

/// POST /remove-text - Remove text from an image
///
/// # Request (multipart form)
/// - `image`: Image file (required)
/// - `languages`: Comma-separated OCR languages - defaults to "en"
/// - `inpaint_radius`: Inpainting neighbourhood radius - defaults to 3
///
/// # Response
/// The processed image as an attachment named `{stem}_cleaned{ext}`.
///
/// # Errors
/// - 400 Bad Request: missing image or invalid fields
/// - 500 Internal Server Error: unreadable image or processing failure
/// - 503 Service Unavailable: no inpainting backend in this build
pub async fn remove_text_handler(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, ApiError> {
    let removal = state.removal.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("Text removal service not available".to_string())
    })?;

    let request = RemoveTextRequest::from_form(form)?;

    // Early returns leave removal of the staged file to the guard's Drop
    let upload = state
        .store
        .stage(&request.image.file_name, &request.image.bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to stage upload: {}", e)))?;

    info!(
        "Processing image {} for text removal (languages={})",
        upload.original_name(),
        request.languages
    );

    let output = removal
        .remove_text(upload.path(), &request.languages, request.inpaint_radius)
        .await?;
    let download_name = upload.cleaned_file_name();
    upload.discard().await;

    let file = tokio::fs::File::open(&output.path)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to open result: {}", e)))?;

    debug!(
        "Streaming {} ({} regions removed)",
        output.path.display(),
        output.regions
    );

    Ok((
        [
            (header::CONTENT_TYPE, mime_type(output.format).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
