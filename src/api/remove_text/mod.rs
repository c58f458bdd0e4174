// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text removal endpoint
//!
//! Provides POST /remove-text returning the image with detected text inpainted.

pub mod handler;
pub mod request;

pub use handler::remove_text_handler;
pub use request::RemoveTextRequest;
