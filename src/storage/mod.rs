// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! On-disk storage for uploads and processed images

pub mod retention;
pub mod temp_store;

pub use retention::{spawn_retention_task, sweep, RetentionPolicy};
pub use temp_store::{cleaned_file_name, sanitize_file_name, StagedUpload, TempFileStore};
