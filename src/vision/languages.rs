// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalized OCR language sets

use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

/// Language used when a request does not name any
pub const DEFAULT_LANGUAGE: &str = "en";

/// Longest accepted language code
pub const MAX_CODE_LEN: usize = 16;

/// A set of OCR language codes
///
/// Codes are trimmed, deduplicated and sorted, so `"ar,en"`, `"en, ar"` and
/// `"en,ar,en"` compare and hash equal. Never empty. Each code is ASCII
/// alphanumerics, `_` or `-`, since codes name model directories on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageSet(Vec<String>);

impl LanguageSet {
    /// Build a set from individual codes; blank codes are ignored
    pub fn new<I, S>(codes: I) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes: Vec<String> = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if let Some(bad) = codes.iter().find(|c| !is_valid_code(c)) {
            return Err(ServiceError::validation(
                "languages",
                format!(
                    "Invalid language code '{}': use up to {} letters, digits, '_' or '-'",
                    bad.chars().take(MAX_CODE_LEN * 2).collect::<String>(),
                    MAX_CODE_LEN
                ),
            ));
        }
        codes.sort();
        codes.dedup();

        if codes.is_empty() {
            return Err(ServiceError::validation(
                "languages",
                "At least one language code is required",
            ));
        }

        Ok(Self(codes))
    }

    /// Parse a comma-separated list such as `"en,ar"`
    pub fn parse(list: &str) -> Result<Self, ServiceError> {
        Self::new(list.split(','))
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_valid_code(code: &str) -> bool {
    code.len() <= MAX_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self(vec![DEFAULT_LANGUAGE.to_string()])
    }
}

impl FromStr for LanguageSet {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}
