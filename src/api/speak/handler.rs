// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech endpoint handler

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::info;

use super::request::SpeakRequest;
use crate::api::errors::ApiError;
use crate::api::form::FormData;
use crate::api::http_server::AppState;
use crate::tts::{AUDIO_FILE_NAME, AUDIO_MIME_TYPE};

/// POST /speak - Synthesize speech
///
/// # Request (form fields)
/// - `text`: Text to speak (required)
/// - `language`: Language code - defaults to "en"
/// - `slow`: Slower speech rate - defaults to false
///
/// # Response
/// MP3 audio as an attachment named `speech.mp3`.
///
/// # Errors
/// - 400 Bad Request: missing/empty text or invalid `slow`
/// - 500 Internal Server Error: synthesis failed
pub async fn speak_handler(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, ApiError> {
    let request = SpeakRequest::from_form(&form)?;

    let audio = state
        .speech
        .synthesize(request.text.as_deref(), &request.language, request.slow)
        .await?;

    info!("Speech synthesized: {} bytes ({})", audio.len(), request.language);

    Ok((
        [
            (header::CONTENT_TYPE, AUDIO_MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", AUDIO_FILE_NAME),
            ),
        ],
        audio,
    )
        .into_response())
}
