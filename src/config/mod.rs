//! Preview storage configuration.
//!
//! Only covers where preview sidecars live and the fallback title; the
//! emulator's own settings are not handled here.
//!
//! ```toml
//! base_dir = "~/.local/share"
//! subdir = "x1box/snapshots"
//! unknown_title = "Unknown Game"
//! ```

mod path;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SnapError};
use crate::title::UNKNOWN_TITLE;

pub use path::{default_base_dir, home_dir, resolve_path};

/// Environment variable overriding the configured base directory.
pub const BASE_DIR_ENV: &str = "XSNAP_BASE_DIR";

/// Fixed location of preview sidecars below the base directory.
pub const DEFAULT_SUBDIR: &str = "x1box/snapshots";

/// Where preview sidecars are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Writable base location; platform local-data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Preview directory relative to the base.
    pub subdir: PathBuf,
    /// Title written when the game reports none.
    pub unknown_title: String,
    /// Directory of the file this config was read from.
    #[serde(skip)]
    origin_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            subdir: PathBuf::from(DEFAULT_SUBDIR),
            unknown_title: UNKNOWN_TITLE.to_string(),
            origin_dir: None,
        }
    }
}

impl StoreConfig {
    /// Config rooted at an explicit base directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SnapError::ConfigParse(e.to_string()))
    }

    /// Load a TOML config file; relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        config.origin_dir = path.parent().map(Path::to_path_buf);
        debug!(path = %path.display(), "Loaded store config");
        Ok(config)
    }

    /// Apply `XSNAP_BASE_DIR` if set and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(BASE_DIR_ENV).filter(|v| !v.is_empty()) {
            debug!(dir = ?dir, "Base directory overridden from environment");
            self.base_dir = Some(PathBuf::from(dir));
            self.origin_dir = None;
        }
        self
    }

    /// Resolved base directory.
    pub fn base_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(dir) if !dir.as_os_str().is_empty() => {
                resolve_path(dir, self.origin_dir.as_deref())
            }
            _ => default_base_dir(),
        }
    }

    /// Directory holding the preview sidecars.
    pub fn preview_dir(&self) -> Result<PathBuf> {
        Ok(self.base_dir()?.join(&self.subdir))
    }

    /// Resolve the preview directory, creating it if missing.
    pub fn ensure_preview_dir(&self) -> Result<PathBuf> {
        let dir = self.preview_dir()?;
        create_private_dir(&dir).map_err(|e| {
            warn!(dir = %dir.display(), error = %e, "Failed to create preview directory");
            SnapError::StorageUnavailable(format!("{}: {e}", dir.display()))
        })?;
        Ok(dir)
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
