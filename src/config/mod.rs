// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every setting can be given as a command-line flag or an environment
//! variable (a `.env` file is loaded at startup).

use clap::{ArgAction, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::RetentionPolicy;

/// Media Tools Node
#[derive(Parser, Debug, Clone)]
#[command(name = "media-tools-node")]
#[command(version = "1.0.0")]
#[command(about = "Text-to-speech and image text removal/extraction over HTTP", long_about = None)]
pub struct NodeConfig {
    /// Interface to bind the HTTP server on
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server on
    #[arg(long, env = "API_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory uploads are staged in for the duration of a request
    #[arg(long, env = "UPLOAD_DIR", default_value = "./uploads")]
    pub upload_dir: PathBuf,

    /// Directory processed images are written to
    #[arg(long, env = "RESULT_DIR", default_value = "./results")]
    pub result_dir: PathBuf,

    /// PaddleOCR ONNX model directory
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "./models/paddleocr-onnx")]
    pub ocr_model_dir: PathBuf,

    /// Maximum number of OCR engines (one per language set) kept loaded
    #[arg(long, env = "ENGINE_CACHE_CAPACITY", default_value_t = 4)]
    pub engine_cache_capacity: usize,

    /// Prefix result files with the upload id so concurrent requests never collide
    #[arg(long, env = "UNIQUE_RESULT_NAMES", default_value_t = true, action = ArgAction::Set)]
    pub unique_result_names: bool,

    /// Delete result files older than this many seconds
    #[arg(long, env = "RESULT_MAX_AGE_SECS")]
    pub result_max_age_secs: Option<u64>,

    /// Keep at most this many result files (oldest deleted first)
    #[arg(long, env = "RESULT_MAX_FILES")]
    pub result_max_files: Option<usize>,

    /// How often the retention sweep runs
    #[arg(long, env = "RETENTION_INTERVAL_SECS", default_value_t = 300)]
    pub retention_interval_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Google Translate top-level domain used for speech synthesis
    #[arg(long, env = "TTS_TLD", default_value = "com")]
    pub tts_tld: String,

    /// Timeout for each speech synthesis HTTP call
    #[arg(long, env = "TTS_TIMEOUT_SECS", default_value_t = 30)]
    pub tts_timeout_secs: u64,
}

impl NodeConfig {
    /// Socket address the server binds to
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", addr, e))
    }

    /// Result retention policy; inactive unless a limit is configured
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_age: self.result_max_age_secs.map(Duration::from_secs),
            max_files: self.result_max_files,
        }
    }

    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(self.retention_interval_secs.max(1))
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs)
    }
}
