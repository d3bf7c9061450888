//! Graphics context abstraction for frame capture.
//!
//! The renderer that owns the GL context implements [`FrameSource`]; the
//! capture code only ever talks to this trait, so it can be exercised with
//! [`mock::MockFrameSource`] without a real context.

pub mod mock;

use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::error::Result;

/// Row alignment the capture path requires when packing pixel reads.
pub const TIGHT_PACK_ALIGNMENT: u32 = 1;

/// A viewport rectangle as reported by the graphics context.
///
/// Signed like the GL query it mirrors; a context with nothing bound can
/// report zero or negative extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if the rectangle covers at least one pixel.
    pub const fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Byte size of an RGBA read of this rectangle, if drawable.
    pub fn rgba_len(&self) -> Option<usize> {
        if !self.is_drawable() {
            return None;
        }
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?
            .checked_mul(4)
    }
}

/// Read access to the currently presented frame.
///
/// Only valid on the thread that owns the graphics context.
pub trait FrameSource {
    /// Whether a graphics context is current on this thread.
    fn has_current_context(&self) -> bool;

    /// Whether a frame has been presented yet (display texture bound).
    fn has_presented_frame(&self) -> bool;

    /// The current viewport rectangle.
    fn viewport(&self) -> Viewport;

    /// Current pixel pack alignment.
    fn pack_alignment(&self) -> u32;

    /// Set the pixel pack alignment for subsequent reads.
    fn set_pack_alignment(&mut self, alignment: u32);

    /// Read the RGBA pixels of `rect` into `out`, rows bottom-up.
    ///
    /// `out` is exactly `rect.width * rect.height * 4` bytes.
    ///
    /// # Errors
    ///
    /// Returns a graphics error if the read could not be issued.
    fn read_rgba(&mut self, rect: Viewport, out: &mut [u8]) -> Result<()>;

    /// Take the oldest pending error raised by the context, if any.
    fn take_error(&mut self) -> Option<String>;
}

/// Sets the pack alignment for its lifetime and restores the previous value
/// on drop, on every exit path.
pub struct PackAlignmentGuard<'a, F: FrameSource + ?Sized> {
    source: &'a mut F,
    previous: u32,
}

impl<'a, F: FrameSource + ?Sized> PackAlignmentGuard<'a, F> {
    pub fn set(source: &'a mut F, alignment: u32) -> Self {
        let previous = source.pack_alignment();
        trace!(previous, alignment, "Overriding pack alignment");
        source.set_pack_alignment(alignment);
        Self { source, previous }
    }
}

impl<F: FrameSource + ?Sized> Deref for PackAlignmentGuard<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.source
    }
}

impl<F: FrameSource + ?Sized> DerefMut for PackAlignmentGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.source
    }
}

impl<F: FrameSource + ?Sized> Drop for PackAlignmentGuard<'_, F> {
    fn drop(&mut self) {
        self.source.set_pack_alignment(self.previous);
    }
}
