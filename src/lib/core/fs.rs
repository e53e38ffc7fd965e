use crate::core::error::{PipelineError, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Create parent directories for a path when missing.
pub fn make_parent_dirs<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| PipelineError::io(parent, "create directory", e))?;
        }
    }
    Ok(())
}

/// Fail with [`PipelineError::FileNotFound`] when `path` does not exist.
pub fn require_file<P: AsRef<Path>>(role: &'static str, path: P) -> Result<()> {
    if path.as_ref().exists() {
        Ok(())
    } else {
        Err(PipelineError::FileNotFound {
            role,
            path: path.as_ref().to_path_buf(),
        })
    }
}

/// Remove a file, treating an already-missing file as success.
///
/// Returns `true` when a file was actually deleted.
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    match fs::remove_file(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PipelineError::io(path, "remove file", e)),
    }
}
