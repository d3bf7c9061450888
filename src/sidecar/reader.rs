//! Reading preview sidecars back for browsing.
//!
//! Reads are optimistic: the owner thread may be rewriting a sidecar at the
//! same time, and a torn read simply shows up as an invalid preview.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use image::{RgbaImage, imageops};
use tracing::debug;

use super::{THUMB_HEADER_LEN, THUMB_VERSION, ThumbnailHeader};
use crate::error::{Result, SnapError};

/// Read a title sidecar. Missing or blank titles yield `None`.
pub fn read_title(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => {
            let title = String::from_utf8_lossy(&bytes);
            let title = title.trim();
            Ok((!title.is_empty()).then(|| title.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A thumbnail read back from disk.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub header: ThumbnailHeader,
    pixels: Vec<u8>,
}

impl Thumbnail {
    /// Raw payload, rows as captured.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Convert to an upright, opaque RGBA image.
    ///
    /// Captured rows are bottom-up, so the image is flipped vertically.
    /// Framebuffer alpha is not meaningful for a preview and is forced to 255.
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let mut pixels = self.pixels.clone();
        for px in pixels.chunks_exact_mut(4) {
            px[3] = u8::MAX;
        }
        let img = RgbaImage::from_raw(
            u32::from(self.header.width),
            u32::from(self.header.height),
            pixels,
        )
        .ok_or_else(|| SnapError::ImageProcessing("payload does not match header".into()))?;
        Ok(imageops::flip_vertical(&img))
    }

    /// Write the preview as a PNG.
    pub fn export_png(&self, out: &Path) -> Result<()> {
        let img = self.to_rgba_image()?;
        img.save_with_format(out, image::ImageFormat::Png)
            .map_err(|e| SnapError::ImageProcessing(e.to_string()))?;
        debug!(path = %out.display(), "Exported preview PNG");
        Ok(())
    }
}

/// Read and validate a thumbnail sidecar.
pub fn read_thumbnail(path: &Path) -> Result<Thumbnail> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SnapError::PreviewNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let invalid = |reason: String| SnapError::InvalidPreview {
        path: path.display().to_string(),
        reason,
    };

    let header = ThumbnailHeader::parse(&bytes)
        .ok_or_else(|| invalid("missing or unrecognized header".to_string()))?;

    if header.version != THUMB_VERSION {
        return Err(invalid(format!("unsupported version {}", header.version)));
    }
    if header.channels != 4 {
        return Err(invalid(format!("unsupported channel count {}", header.channels)));
    }
    if header.width == 0 || header.height == 0 {
        return Err(invalid(format!(
            "empty dimensions {}x{}",
            header.width, header.height
        )));
    }

    let payload_len = header.payload_len();
    let payload = &bytes[THUMB_HEADER_LEN..];
    if payload.len() < payload_len {
        return Err(invalid(format!(
            "payload truncated: {} of {payload_len} bytes",
            payload.len()
        )));
    }

    Ok(Thumbnail {
        header,
        pixels: payload[..payload_len].to_vec(),
    })
}
