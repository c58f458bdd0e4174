// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod extract_text;
pub mod form;
pub mod health;
pub mod http_server;
pub mod remove_text;
pub mod speak;

pub use errors::{ApiError, ErrorResponse};
pub use extract_text::{extract_text_handler, DetailedResult, ExtractTextRequest, ExtractTextResponse};
pub use form::{FormData, UploadedFile};
pub use health::{health_handler, HealthResponse};
pub use http_server::{create_router, start_server, AppState};
pub use remove_text::{remove_text_handler, RemoveTextRequest};
pub use speak::{speak_handler, SpeakRequest};
