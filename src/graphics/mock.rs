//! Mock graphics context for unit testing.
//!
//! Serves a synthetic frame where every pixel encodes its own source
//! coordinates, so tests can tell exactly which pixel a sampler picked.
//!
//! # Example
//!
//! ```rust,ignore
//! use xsnap::graphics::mock::{MockFrameSource, FrameOp};
//!
//! let mut frame = MockFrameSource::new(1280, 720);
//! let image = xsnap::capture::capture_thumbnail(&mut frame).unwrap();
//! frame.assert_contains(&FrameOp::ReadRgba { width: 1280, height: 720, alignment: 1 });
//! ```

use tracing::debug;

use super::{FrameSource, Viewport};
use crate::error::{Result, SnapError};

/// Recorded graphics operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOp {
    SetPackAlignment(u32),
    ReadRgba {
        width: i32,
        height: i32,
        alignment: u32,
    },
}

/// Mock frame source with configurable failures.
#[derive(Debug)]
pub struct MockFrameSource {
    viewport: Viewport,
    context: bool,
    presented: bool,
    alignment: u32,
    read_error: Option<String>,
    pending_error: Option<String>,
    operations: Vec<FrameOp>,
}

impl MockFrameSource {
    /// A live context presenting a `width`×`height` frame at the origin.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        debug!(width, height, "Creating mock frame source");
        Self {
            viewport: Viewport::new(0, 0, width, height),
            context: true,
            presented: true,
            alignment: 4,
            read_error: None,
            pending_error: None,
            operations: Vec::new(),
        }
    }

    /// A thread with no current graphics context.
    #[must_use]
    pub fn without_context() -> Self {
        Self {
            context: false,
            presented: false,
            ..Self::new(0, 0)
        }
    }

    /// A live context that has not presented a frame yet.
    #[must_use]
    pub fn without_frame(width: i32, height: i32) -> Self {
        Self {
            presented: false,
            ..Self::new(width, height)
        }
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Make the next read fail outright.
    pub fn fail_next_read(&mut self, message: &str) {
        self.read_error = Some(message.to_string());
    }

    /// Leave an error pending on the context after the next read.
    pub fn raise_after_read(&mut self, message: &str) {
        self.pending_error = Some(message.to_string());
    }

    /// Pixel value the mock serves at absolute coordinates `(x, y)`.
    ///
    /// Layout is `[x lo, x hi, y lo, y hi]`.
    #[must_use]
    pub fn pixel_at(x: i32, y: i32) -> [u8; 4] {
        let x = x.to_le_bytes();
        let y = y.to_le_bytes();
        [x[0], x[1], y[0], y[1]]
    }

    /// Decode the coordinates stored in a pixel produced by [`Self::pixel_at`].
    #[must_use]
    pub fn coords_of(pixel: &[u8]) -> (i32, i32) {
        let x = u16::from_le_bytes([pixel[0], pixel[1]]);
        let y = u16::from_le_bytes([pixel[2], pixel[3]]);
        (i32::from(x), i32::from(y))
    }

    /// All recorded operations.
    #[must_use]
    pub fn operations(&self) -> &[FrameOp] {
        &self.operations
    }

    /// Assert a specific operation was performed at least once.
    ///
    /// # Panics
    ///
    /// Panics if the operation was not found.
    pub fn assert_contains(&self, expected: &FrameOp) {
        assert!(
            self.operations.contains(expected),
            "Expected operation {expected:?} not found in: {:#?}",
            self.operations
        );
    }

    /// Assert no pixel read was attempted.
    ///
    /// # Panics
    ///
    /// Panics if a read was recorded.
    pub fn assert_no_reads(&self) {
        let reads: Vec<_> = self
            .operations
            .iter()
            .filter(|op| matches!(op, FrameOp::ReadRgba { .. }))
            .collect();
        assert!(reads.is_empty(), "Expected no reads, but found: {reads:#?}");
    }
}

impl FrameSource for MockFrameSource {
    fn has_current_context(&self) -> bool {
        self.context
    }

    fn has_presented_frame(&self) -> bool {
        self.presented
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn pack_alignment(&self) -> u32 {
        self.alignment
    }

    fn set_pack_alignment(&mut self, alignment: u32) {
        self.operations.push(FrameOp::SetPackAlignment(alignment));
        self.alignment = alignment;
    }

    fn read_rgba(&mut self, rect: Viewport, out: &mut [u8]) -> Result<()> {
        self.operations.push(FrameOp::ReadRgba {
            width: rect.width,
            height: rect.height,
            alignment: self.alignment,
        });

        if let Some(message) = self.read_error.take() {
            return Err(SnapError::Graphics(message));
        }

        let mut pixels = out.chunks_exact_mut(4);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                if let Some(px) = pixels.next() {
                    px.copy_from_slice(&Self::pixel_at(x, y));
                }
            }
        }
        Ok(())
    }

    fn take_error(&mut self) -> Option<String> {
        self.pending_error.take()
    }
}
