//! Best-effort writing of preview sidecars.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, warn};

use super::{SidecarPaths, ThumbnailHeader};
use crate::capture::PreviewImage;
use crate::config::StoreConfig;
use crate::error::{Result, SnapError};

/// Writes title and thumbnail sidecars into the configured preview directory.
#[derive(Debug, Clone)]
pub struct SidecarWriter {
    config: StoreConfig,
}

impl SidecarWriter {
    pub const fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Sidecar locations for `name`, creating the preview directory if needed.
    pub fn paths_for(&self, name: &str) -> Result<SidecarPaths> {
        let dir = self.config.ensure_preview_dir()?;
        Ok(SidecarPaths::new(&dir, name))
    }

    /// Write both sidecars for `name`.
    ///
    /// The title is written first and stays on disk even when no image is
    /// available; in that case [`SnapError::NoFrame`] is returned after the
    /// title write.
    pub fn write_preview(
        &self,
        name: &str,
        title: &str,
        image: Option<&PreviewImage>,
    ) -> Result<SidecarPaths> {
        let paths = self.paths_for(name)?;

        if let Err(e) = write_title_file(&paths.title, title) {
            warn!(path = %paths.title.display(), error = %e, "Failed to write title sidecar");
        }

        let image = image.ok_or(SnapError::NoFrame)?;
        write_thumbnail_file(&paths.thumbnail, image)?;

        debug!(
            name,
            thumbnail = %paths.thumbnail.display(),
            "Wrote preview sidecars"
        );
        Ok(paths)
    }
}

/// Overwrite the title sidecar with the raw title bytes.
pub fn write_title_file(path: &Path, title: &str) -> Result<()> {
    fs::write(path, title.as_bytes())?;
    Ok(())
}

/// Overwrite the thumbnail sidecar with header and payload.
///
/// Not transactional: after a failed write the file keeps whatever prefix
/// made it to disk.
pub fn write_thumbnail_file(path: &Path, image: &PreviewImage) -> Result<()> {
    let mut file = File::create(path)?;

    let header = ThumbnailHeader::current().to_bytes();
    write_counted(&mut file, &header, path)?;
    write_counted(&mut file, image.as_bytes(), path)?;
    file.flush()?;
    Ok(())
}

/// Write all of `buf`, reporting how far it got on failure.
fn write_counted<W: Write>(out: &mut W, buf: &[u8], path: &Path) -> Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match out.write(&buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(path = %path.display(), written, error = %e, "Write failed");
                break;
            }
        }
    }

    if written < buf.len() {
        return Err(SnapError::ShortWrite {
            path: path.display().to_string(),
            written,
            expected: buf.len(),
        });
    }
    Ok(())
}
