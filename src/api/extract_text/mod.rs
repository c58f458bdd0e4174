// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction endpoint
//!
//! Provides POST /extract-text returning recognized text with positions.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::extract_text_handler;
pub use request::ExtractTextRequest;
pub use response::{DetailedResult, ExtractTextResponse};
