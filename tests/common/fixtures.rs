//! Test fixture helpers for preview stores and state streams.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use xsnap::capture::{PREVIEW_LEN, PreviewImage};
use xsnap::config::StoreConfig;
use xsnap::extra_data;
use xsnap::sidecar::{SidecarPaths, SidecarWriter};

/// A temporary preview store with automatic cleanup.
pub struct TestStore {
    pub dir: TempDir,
}

impl TestStore {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn config(&self) -> StoreConfig {
        StoreConfig::with_base_dir(self.path())
    }

    /// Directory where sidecars end up.
    #[must_use]
    pub fn preview_dir(&self) -> PathBuf {
        self.path().join("x1box").join("snapshots")
    }

    /// Write a gradient preview for `name` and return its sidecar paths.
    ///
    /// # Panics
    ///
    /// Panics if the sidecars cannot be written.
    #[must_use]
    pub fn write_preview(&self, name: &str, title: &str) -> SidecarPaths {
        SidecarWriter::new(self.config())
            .write_preview(name, title, Some(&gradient_preview()))
            .expect("Failed to write preview")
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Preview whose red channel is x and green channel is y (both mod 256).
///
/// # Panics
///
/// Never in practice; the buffer always has the preview size.
#[must_use]
pub fn gradient_preview() -> PreviewImage {
    let mut pixels = Vec::with_capacity(PREVIEW_LEN);
    for y in 0..240u32 {
        for x in 0..320u32 {
            pixels.extend_from_slice(&[x as u8, y as u8, 0x40, 0x00]);
        }
    }
    PreviewImage::from_raw(pixels).expect("preview size")
}

/// Fake engine state followed by an extra-data chunk for `title`.
///
/// # Panics
///
/// Panics if writing the file fails.
pub fn write_state_stream(path: &Path, engine_state: &[u8], title: &str) {
    let mut stream = engine_state.to_vec();
    extra_data::encode(&mut stream, title).expect("encode chunk");
    fs::write(path, stream).expect("write state stream");
}
