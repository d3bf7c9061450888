//! Thumbnail capture from the presented frame.
//!
//! The frame is read at full viewport resolution and reduced to a fixed
//! 320x240 RGBA preview with nearest-neighbour sampling. Sampling uses exact
//! integer arithmetic so row and column picks never drift.

use tracing::{debug, warn};

use crate::graphics::{FrameSource, PackAlignmentGuard, TIGHT_PACK_ALIGNMENT};

/// Preview width in pixels.
pub const PREVIEW_WIDTH: u16 = 320;
/// Preview height in pixels.
pub const PREVIEW_HEIGHT: u16 = 240;
/// Bytes per preview pixel (RGBA).
pub const PREVIEW_CHANNELS: u16 = 4;
/// Byte size of a preview payload.
pub const PREVIEW_LEN: usize =
    PREVIEW_WIDTH as usize * PREVIEW_HEIGHT as usize * PREVIEW_CHANNELS as usize;

/// A captured 320x240 RGBA preview, rows in the order the context produced
/// them (bottom-up for GL).
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pixels: Vec<u8>,
}

impl PreviewImage {
    /// Wrap a raw payload; `None` unless it is exactly [`PREVIEW_LEN`] bytes.
    pub fn from_raw(pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == PREVIEW_LEN).then_some(Self { pixels })
    }

    pub const fn width(&self) -> u16 {
        PREVIEW_WIDTH
    }

    pub const fn height(&self) -> u16 {
        PREVIEW_HEIGHT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at preview coordinates.
    pub fn pixel(&self, x: u16, y: u16) -> Option<&[u8]> {
        if x >= PREVIEW_WIDTH || y >= PREVIEW_HEIGHT {
            return None;
        }
        let off = (usize::from(y) * usize::from(PREVIEW_WIDTH) + usize::from(x)) * 4;
        self.pixels.get(off..off + 4)
    }
}

impl std::fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewImage")
            .field("width", &PREVIEW_WIDTH)
            .field("height", &PREVIEW_HEIGHT)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Capture the currently presented frame as a preview.
///
/// Returns `None` when there is nothing to capture (no context, no presented
/// frame, empty viewport) or when the context reports an error during the
/// read. A partial image is never returned.
pub fn capture_thumbnail<F: FrameSource + ?Sized>(source: &mut F) -> Option<PreviewImage> {
    if !source.has_current_context() || !source.has_presented_frame() {
        debug!("No presented frame to capture");
        return None;
    }

    let viewport = source.viewport();
    let Some(src_len) = viewport.rgba_len() else {
        debug!(
            width = viewport.width,
            height = viewport.height,
            "Viewport is empty, skipping capture"
        );
        return None;
    };

    let mut src = vec![0u8; src_len];
    {
        let mut source = PackAlignmentGuard::set(source, TIGHT_PACK_ALIGNMENT);
        if let Err(e) = source.read_rgba(viewport, &mut src) {
            warn!(error = %e, "Frame read failed");
            return None;
        }
    }
    if let Some(message) = source.take_error() {
        warn!(error = %message, "Graphics error during frame read");
        return None;
    }

    let (Ok(src_w), Ok(src_h)) = (u32::try_from(viewport.width), u32::try_from(viewport.height))
    else {
        return None;
    };
    let image = downsample_nearest(&src, src_w, src_h);
    debug!(
        src_width = viewport.width,
        src_height = viewport.height,
        "Captured preview"
    );
    image
}

/// Nearest-neighbour reduction of an RGBA frame to the preview size.
///
/// Destination pixel `(x, y)` takes source pixel
/// `(x * src_w / 320, y * src_h / 240)`, with 64-bit intermediates.
/// Returns `None` if `src` is not `src_w * src_h * 4` bytes or either
/// dimension is zero.
pub fn downsample_nearest(src: &[u8], src_w: u32, src_h: u32) -> Option<PreviewImage> {
    if src_w == 0 || src_h == 0 {
        return None;
    }
    let expected = u64::from(src_w) * u64::from(src_h) * 4;
    if src.len() as u64 != expected {
        return None;
    }

    let dst_w = u64::from(PREVIEW_WIDTH);
    let dst_h = u64::from(PREVIEW_HEIGHT);
    let mut dst = vec![0u8; PREVIEW_LEN];

    for (y, row) in dst.chunks_exact_mut(usize::from(PREVIEW_WIDTH) * 4).enumerate() {
        let src_y = (y as u64 * u64::from(src_h)) / dst_h;
        let row_base = src_y * u64::from(src_w);
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let src_x = (x as u64 * u64::from(src_w)) / dst_w;
            // Bounded by `src.len()`, which already fits in usize.
            let off = usize::try_from((row_base + src_x) * 4).ok()?;
            px.copy_from_slice(src.get(off..off + 4)?);
        }
    }

    PreviewImage::from_raw(dst)
}
