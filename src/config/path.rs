//! Path resolution helpers for preview storage configuration.
//!
//! Supports absolute paths, paths relative to the config file, and "~" home
//! directory expansion.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Result, SnapError};

/// Resolve a configured path.
///
/// Resolution rules:
/// 1. Paths starting with `~`: expanded to home directory
/// 2. Absolute paths: used as-is
/// 3. Relative paths: resolved relative to `origin_dir`, or used as-is
///    when there is no originating config file
pub fn resolve_path(path: &Path, origin_dir: Option<&Path>) -> Result<PathBuf> {
    trace!(path = %path.display(), "Resolving path");

    let path_str = path.to_string_lossy();

    if path_str == "~" || path_str.starts_with("~/") {
        let home = home_dir()?;
        let rest = path_str.strip_prefix("~/").unwrap_or("");
        let resolved = if rest.is_empty() { home } else { home.join(rest) };
        debug!(
            original = %path.display(),
            resolved = %resolved.display(),
            "Expanded home directory path"
        );
        return Ok(resolved);
    }

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    match origin_dir {
        Some(dir) => {
            let resolved = dir.join(path);
            debug!(
                original = %path.display(),
                resolved = %resolved.display(),
                "Resolved relative path"
            );
            Ok(resolved)
        }
        None => Ok(path.to_path_buf()),
    }
}

/// Resolve the user's home directory (cross-platform).
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        SnapError::StorageUnavailable("Could not determine home directory".to_string())
    })
}

/// Platform default for the writable base location.
pub fn default_base_dir() -> Result<PathBuf> {
    dirs::data_local_dir().ok_or_else(|| {
        SnapError::StorageUnavailable("Could not determine local data directory".to_string())
    })
}
