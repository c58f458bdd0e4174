// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Media Tools Node

/// Semantic version number reported by `/health`
pub const VERSION_NUMBER: &str = "1.0.0";

/// Service identifier for OCR-based text removal
pub const SERVICE_TEXT_REMOVAL: &str = "text_removal";

/// Service identifier for OCR-based text extraction
pub const SERVICE_TEXT_EXTRACTION: &str = "text_extraction";

/// Service identifier for speech synthesis
pub const SERVICE_TEXT_TO_SPEECH: &str = "text_to_speech";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("media-tools-node v{}", VERSION_NUMBER)
}
