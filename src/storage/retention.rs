// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retention policy for the result directory
//!
//! Processed images accumulate in the result directory. When a policy is
//! configured a background task periodically deletes files that are too old
//! and trims the directory to a maximum file count, oldest first.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Limits applied to the result directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Files whose modification time is older than this are removed
    pub max_age: Option<Duration>,
    /// At most this many files are kept
    pub max_files: Option<usize>,
}

impl RetentionPolicy {
    pub fn is_active(&self) -> bool {
        self.max_age.is_some() || self.max_files.is_some()
    }
}

/// Apply `policy` to `dir` once, returning the number of files removed
///
/// Hidden files (in-flight partial writes) are never touched.
pub fn sweep(dir: &Path, policy: &RetentionPolicy) -> io::Result<usize> {
    if !policy.is_active() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut files: Vec<(PathBuf, SystemTime)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push((entry.path(), metadata.modified()?));
    }

    let mut removed = 0;

    if let Some(max_age) = policy.max_age {
        files.retain(|(path, modified)| {
            let age = now.duration_since(*modified).unwrap_or_default();
            if age > max_age && remove(path) {
                removed += 1;
                false
            } else {
                true
            }
        });
    }

    if let Some(max_files) = policy.max_files {
        if files.len() > max_files {
            // Newest first; everything past the limit goes
            files.sort_by(|a, b| b.1.cmp(&a.1));
            for (path, _) in files.drain(max_files..) {
                if remove(&path) {
                    removed += 1;
                }
            }
        }
    }

    Ok(removed)
}

fn remove(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!("Removed old file: {}", path.display());
            true
        }
        Err(e) => {
            error!("Error deleting {}: {}", path.display(), e);
            false
        }
    }
}

/// Run `sweep` every `interval` in the background
///
/// Returns `None` when the policy has no limits configured.
pub fn spawn_retention_task(
    dir: PathBuf,
    policy: RetentionPolicy,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    if !policy.is_active() {
        debug!("Result retention disabled for {}", dir.display());
        return None;
    }

    info!(
        "Result retention enabled for {}: max_age={:?}, max_files={:?}, every {:?}",
        dir.display(),
        policy.max_age,
        policy.max_files,
        interval
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let dir = dir.clone();
            match tokio::task::spawn_blocking(move || sweep(&dir, &policy)).await {
                Ok(Ok(removed)) if removed > 0 => debug!("Retention sweep removed {} files", removed),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!("Retention sweep failed: {}", e),
                Err(e) => error!("Retention sweep task panicked: {}", e),
            }
        }
    }))
}
