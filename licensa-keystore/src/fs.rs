//! Atomic file replacement.
//!
//! Every write goes to a temp file in the target's directory and is then
//! renamed over the target, so readers see either the old or the new
//! contents and a failed write leaves nothing behind.

use crate::error::{KeyStoreError, KeyStoreResult};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically writes `contents` to `path`, replacing any existing file.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`KeyStoreError::Storage`] if the temp file cannot be written or
/// renamed into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> KeyStoreResult<()> {
    let tmp = staged(path, contents)?;
    tmp.persist(path)
        .map_err(|e| KeyStoreError::storage(path, e.error))?;
    Ok(())
}

/// Atomically creates `path` with `contents` only if it does not exist yet.
///
/// Returns `Ok(false)` without touching the existing file when `path` is
/// already present.
pub fn create_new_atomic(path: &Path, contents: &[u8]) -> KeyStoreResult<bool> {
    let tmp = staged(path, contents)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(KeyStoreError::storage(path, e.error)),
    }
}

fn staged(path: &Path, contents: &[u8]) -> KeyStoreResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| KeyStoreError::storage(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".licensa-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| KeyStoreError::storage(dir, e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| KeyStoreError::storage(tmp.path(), e))?;
    Ok(tmp)
}
