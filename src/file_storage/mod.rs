//! File-based storage helpers
//!
//! Exported documents are written next to the user, never into a project
//! store: the document service owns persistence. This module only handles
//! directory creation and atomic writes of downloaded bytes.

pub mod exports;

use crate::utils::ResultExt;
use std::fs;
use std::path::Path;

/// Common file operations result type
pub type FileResult<T> = Result<T, String>;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write bytes to a file atomically (temp file + rename)
pub fn atomic_write(path: &Path, content: &[u8]) -> FileResult<()> {
    let temp_path = path.with_extension("tmp");

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content)
        .with_context(&format!("Failed to write temp file {:?}", temp_path))?;

    fs::rename(&temp_path, path)
        .with_context(&format!("Failed to rename {:?} to {:?}", temp_path, path))?;

    Ok(())
}
