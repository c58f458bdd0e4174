// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google Translate speech client
//!
//! Speaks the same batchexecute RPC the Translate web UI uses. The service
//! only accepts short utterances, so text is split into chunks of at most
//! `MAX_CHUNK_CHARS` characters and the returned MP3 segments are
//! concatenated.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::{Bytes, BytesMut};
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{SpeechSynthesizer, SynthesisError};

/// Longest text the RPC accepts in one call
pub const MAX_CHUNK_CHARS: usize = 100;

const TTS_RPC_ID: &str = "jQ1olc";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Client for Google Translate text-to-speech
pub struct GoogleTts {
    client: Client,
    endpoint: String,
    audio_pattern: Regex,
}

impl GoogleTts {
    /// Create a client for `translate.google.{tld}`
    pub fn new(tld: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = format!(
            "https://translate.google.{}/_/TranslateWebserverUi/data/batchexecute",
            tld
        );
        Self::with_endpoint(&endpoint, timeout)
    }

    /// Create a client against an explicit batchexecute URL
    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let audio_pattern = Regex::new(&format!(r#"{}","\[\\"(.*?)\\"\]"#, TTS_RPC_ID))?;

        info!("Speech client configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            audio_pattern,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the `f.req` form value for one chunk
    fn package_rpc(text: &str, language: &str, slow: bool) -> String {
        let speed = if slow {
            serde_json::Value::Bool(true)
        } else {
            serde_json::Value::Null
        };
        let parameter = serde_json::json!([text, language, speed, "null"]).to_string();
        serde_json::json!([[[TTS_RPC_ID, parameter, null, "generic"]]]).to_string()
    }

    /// Pull the base64 MP3 segment out of a batchexecute response body
    fn extract_audio(&self, body: &str, language: &str) -> Result<Vec<u8>, SynthesisError> {
        let no_audio = || SynthesisError::NoAudio {
            language: language.to_string(),
        };

        let line = body
            .lines()
            .find(|line| line.contains(TTS_RPC_ID))
            .ok_or_else(no_audio)?;

        let encoded = self
            .audio_pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(no_audio)?;

        Ok(STANDARD.decode(encoded)?)
    }

    async fn synthesize_chunk(
        &self,
        chunk: &str,
        language: &str,
        slow: bool,
    ) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::REFERER, "http://translate.google.com/")
            .form(&[("f.req", Self::package_rpc(chunk, language, slow))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                language: language.to_string(),
            });
        }

        let body = response.text().await?;
        self.extract_audio(&body, language)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        slow: bool,
    ) -> Result<Bytes, SynthesisError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let mut audio = BytesMut::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let segment = self.synthesize_chunk(chunk, language, slow).await?;
            debug!("Chunk {}/{}: {} bytes", i + 1, chunks.len(), segment.len());
            audio.extend_from_slice(&segment);
        }

        Ok(audio.freeze())
    }
}

/// Split text on whitespace into chunks of at most `max_chars` characters
///
/// Words longer than `max_chars` are hard-split on character boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|piece| piece.iter().collect::<String>()));
            continue;
        }

        let separator = usize::from(!current.is_empty());
        if current_len + separator + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
