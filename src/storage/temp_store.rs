// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload staging and result file storage
//!
//! Uploads are written to the upload directory as `{uuid}_{name}` and live
//! exactly as long as their `StagedUpload` guard. Processed images are written
//! to the result directory under a name derived from the upload.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Length of a hyphenated v4 UUID prefix
const UUID_PREFIX_LEN: usize = 36;

/// Suffix appended to the stem of processed images
const CLEANED_SUFFIX: &str = "_cleaned";

/// Upload staging area plus result directory
#[derive(Debug, Clone)]
pub struct TempFileStore {
    upload_dir: PathBuf,
    result_dir: PathBuf,
    unique_result_names: bool,
}

impl TempFileStore {
    /// Create the store, creating both directories if needed
    ///
    /// Both paths are made absolute so result paths handed back to callers
    /// stay valid regardless of the working directory.
    pub async fn new(
        upload_dir: impl AsRef<Path>,
        result_dir: impl AsRef<Path>,
        unique_result_names: bool,
    ) -> io::Result<Self> {
        tokio::fs::create_dir_all(upload_dir.as_ref()).await?;
        tokio::fs::create_dir_all(result_dir.as_ref()).await?;

        let upload_dir = tokio::fs::canonicalize(upload_dir.as_ref()).await?;
        let result_dir = tokio::fs::canonicalize(result_dir.as_ref()).await?;

        debug!(
            "Temp file store ready: uploads={}, results={}, unique_names={}",
            upload_dir.display(),
            result_dir.display(),
            unique_result_names
        );

        Ok(Self {
            upload_dir,
            result_dir,
            unique_result_names,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Persist an uploaded blob under a unique name
    pub async fn stage(&self, original_name: &str, data: &[u8]) -> io::Result<StagedUpload> {
        let id = Uuid::new_v4();
        let original_name = sanitize_file_name(original_name);
        let path = self.upload_dir.join(format!("{}_{}", id, original_name));

        tokio::fs::write(&path, data).await?;
        debug!("Staged upload {} ({} bytes)", path.display(), data.len());

        Ok(StagedUpload {
            id,
            original_name,
            path,
            removed: false,
        })
    }

    /// Result path for an image staged (or otherwise stored) at `image_path`
    ///
    /// `{stem}_cleaned{ext}` of the image's file name. With unique naming
    /// disabled the upload id prefix is stripped, so two uploads sharing a
    /// base name map to the same result file.
    pub fn result_path_for(&self, image_path: &Path) -> PathBuf {
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let base = if self.unique_result_names {
            file_name.as_str()
        } else {
            strip_upload_id(&file_name)
        };

        self.result_dir.join(cleaned_file_name(base))
    }

    /// Write a result file atomically
    ///
    /// Data goes to a uniquely named sibling first and is renamed into place,
    /// so concurrent writers of the same name never leave a torn file.
    pub async fn persist_result(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let partial = path.with_file_name(format!(
            ".{}.{}.part",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Uuid::new_v4()
        ));

        tokio::fs::write(&partial, data).await?;
        if let Err(e) = tokio::fs::rename(&partial, path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        debug!("Wrote result {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    /// Remove uploads left behind by a previous process
    pub async fn purge_uploads(&self) -> io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.upload_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Failed to remove stale upload {}: {}", entry.path().display(), e),
                }
            }
        }

        if removed > 0 {
            info!("Removed {} stale uploads from {}", removed, self.upload_dir.display());
        }
        Ok(removed)
    }
}

/// An upload on disk
///
/// Handlers call [`StagedUpload::discard`] once they are done with the file.
/// If the guard is dropped first (an early error return, a cancelled
/// request), the file is removed on drop instead.
#[derive(Debug)]
pub struct StagedUpload {
    id: Uuid,
    original_name: String,
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Sanitized client-supplied file name
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Download name for the processed version of this upload
    pub fn cleaned_file_name(&self) -> String {
        cleaned_file_name(&self.original_name)
    }

    /// Delete the staged file without blocking the runtime
    pub async fn discard(mut self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed staged upload {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staged upload {}: {}", self.path.display(), e),
        }
        self.removed = true;
    }
}

impl Drop for StagedUpload {
    // Blocking remove, but only reached when `discard` was skipped; a single
    // unlink of a small file.
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged upload {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staged upload {}: {}", self.path.display(), e),
        }
    }
}

/// Reduce a client-supplied file name to a safe single path component
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// `photo.png` -> `photo_cleaned.png`
pub fn cleaned_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, CLEANED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, CLEANED_SUFFIX),
    }
}

fn strip_upload_id(file_name: &str) -> &str {
    match (file_name.get(..UUID_PREFIX_LEN), file_name.get(UUID_PREFIX_LEN..)) {
        (Some(prefix), Some(rest)) if rest.starts_with('_') && Uuid::parse_str(prefix).is_ok() => {
            &rest[1..]
        }
        _ => file_name,
    }
}
