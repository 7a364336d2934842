// Cache root resolution.
// Picks the platform cache directory unless an explicit override is given.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Result, StarpickError};

/// Resolve the cache root, creating the directory if absent.
///
/// An override (tests, `--cache-dir`) wins; otherwise the platform cache
/// directory is used (~/.cache/starpick on Linux).
pub fn cache_root(override_path: Option<&Path>) -> Result<PathBuf> {
    let root = match override_path {
        Some(path) => path.to_path_buf(),
        None => ProjectDirs::from("", "", "starpick")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or_else(|| {
                StarpickError::Other("could not resolve a user cache directory".to_string())
            })?,
    };
    fs::create_dir_all(&root)?;
    Ok(root)
}
