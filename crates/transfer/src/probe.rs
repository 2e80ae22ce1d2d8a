use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::MAX_UPLOAD_SIZE;

/// Failures detected while probing a local file.
///
/// All of these occur before any network call and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// Metadata for a probed local file. Immutable once created.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    /// Canonical absolute path.
    pub path: PathBuf,
    /// File name shown to the backend and in progress output.
    pub display_name: String,
    pub size_bytes: u64,
    /// Declared MIME type, from extension lookup.
    pub mime_type: String,
    pub modified_at: SystemTime,
}

/// Inspects a local path and returns its descriptor.
///
/// Paths containing traversal sequences (`..`), embedded null bytes
/// or home-directory shortcuts (`~`) are rejected before resolution.
/// Directories fail with [`ProbeError::NotAFile`]; anything the
/// filesystem refuses to describe fails with
/// [`ProbeError::Unreadable`].
pub fn probe(path: &str) -> Result<FileDescriptor, ProbeError> {
    reject_unsafe(path)?;

    let canonical = fs::canonicalize(path)
        .map_err(|e| ProbeError::Unreadable(format!("{path}: {e}")))?;

    let meta = fs::metadata(&canonical)
        .map_err(|e| ProbeError::Unreadable(format!("{}: {e}", canonical.display())))?;

    if meta.is_dir() {
        return Err(ProbeError::NotAFile(canonical.display().to_string()));
    }

    let size = meta.len();
    if size > MAX_UPLOAD_SIZE {
        return Err(ProbeError::TooLarge {
            size,
            limit: MAX_UPLOAD_SIZE,
        });
    }

    let display_name = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ProbeError::InvalidPath(format!("no file name: {path}")))?;

    let mime_type = mime_for(&canonical);

    let modified_at = meta
        .modified()
        .map_err(|e| ProbeError::Unreadable(format!("{}: {e}", canonical.display())))?;

    debug!(file = %display_name, bytes = size, mime = %mime_type, "probed file");

    Ok(FileDescriptor {
        path: canonical,
        display_name,
        size_bytes: size,
        mime_type,
        modified_at,
    })
}

/// Rejects path-injection attempts before touching the filesystem.
fn reject_unsafe(path: &str) -> Result<(), ProbeError> {
    if path.is_empty() {
        return Err(ProbeError::InvalidPath("empty path".into()));
    }
    if path.contains('\0') {
        return Err(ProbeError::InvalidPath("path contains null byte".into()));
    }
    if path.starts_with('~') {
        return Err(ProbeError::InvalidPath(format!(
            "home-directory shortcut not allowed: {path}"
        )));
    }
    for component in Path::new(path).components() {
        if matches!(component, Component::ParentDir) {
            return Err(ProbeError::InvalidPath(format!(
                "parent directory traversal not allowed: {path}"
            )));
        }
    }
    Ok(())
}

/// Extension-based MIME lookup with an unknown-binary fallback.
fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}
