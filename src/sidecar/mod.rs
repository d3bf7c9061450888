//! Preview sidecar files stored beside each snapshot.
//!
//! # Directory Structure
//!
//! ```text
//! <base>/
//! └── x1box/snapshots/
//!     ├── <stem>.title     # raw UTF-8 title, no header
//!     └── <stem>.thm       # 12-byte header + 320x240 RGBA payload
//! ```
//!
//! # Thumbnail format
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `"X1TH"` |
//! | 4 | 2 | version (LE, = 1) |
//! | 6 | 2 | width (LE) |
//! | 8 | 2 | height (LE) |
//! | 10 | 2 | channels (LE, = 4) |
//! | 12 | w·h·c | raw pixels, rows as captured |
//!
//! The stem is derived from the snapshot name and is not collision-free:
//! names differing only in replaced characters share sidecars.

mod reader;
mod writer;

use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::capture::{PREVIEW_CHANNELS, PREVIEW_HEIGHT, PREVIEW_WIDTH};

pub use reader::{Thumbnail, read_thumbnail, read_title};
pub use writer::{SidecarWriter, write_thumbnail_file, write_title_file};

/// Thumbnail file magic.
pub const THUMB_MAGIC: [u8; 4] = *b"X1TH";
/// Current thumbnail format version.
pub const THUMB_VERSION: u16 = 1;
/// Size of the thumbnail header in bytes.
pub const THUMB_HEADER_LEN: usize = 12;

/// Extension of the title sidecar.
pub const TITLE_EXT: &str = "title";
/// Extension of the thumbnail sidecar.
pub const THUMB_EXT: &str = "thm";

/// Stem used when nothing of the snapshot name survives sanitizing.
pub const FALLBACK_STEM: &str = "snapshot";
/// Longest stem produced, in bytes.
pub const MAX_STEM_LEN: usize = 127;

/// Map a snapshot name to a filesystem-safe file stem.
///
/// Every byte that is not ASCII alphanumeric, `_` or `-` becomes `_`. An
/// empty name, or one where every byte had to be replaced, maps to
/// [`FALLBACK_STEM`].
pub fn sanitize_stem(name: &str) -> String {
    let mut kept_any = false;
    let stem: String = name
        .bytes()
        .take(MAX_STEM_LEN)
        .map(|b| {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                kept_any = true;
                char::from(b)
            } else {
                '_'
            }
        })
        .collect();

    if kept_any {
        stem
    } else {
        FALLBACK_STEM.to_string()
    }
}

/// Locations of the two sidecars for one snapshot name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidecarPaths {
    pub title: PathBuf,
    pub thumbnail: PathBuf,
}

impl SidecarPaths {
    pub fn new(dir: &Path, name: &str) -> Self {
        let stem = sanitize_stem(name);
        Self {
            title: dir.join(format!("{stem}.{TITLE_EXT}")),
            thumbnail: dir.join(format!("{stem}.{THUMB_EXT}")),
        }
    }
}

/// Decoded thumbnail header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThumbnailHeader {
    pub version: u16,
    pub width: u16,
    pub height: u16,
    pub channels: u16,
}

impl ThumbnailHeader {
    /// Header for a freshly captured preview.
    pub const fn current() -> Self {
        Self {
            version: THUMB_VERSION,
            width: PREVIEW_WIDTH,
            height: PREVIEW_HEIGHT,
            channels: PREVIEW_CHANNELS,
        }
    }

    pub fn to_bytes(self) -> [u8; THUMB_HEADER_LEN] {
        let mut buf = [0u8; THUMB_HEADER_LEN];
        buf[0..4].copy_from_slice(&THUMB_MAGIC);
        LittleEndian::write_u16(&mut buf[4..6], self.version);
        LittleEndian::write_u16(&mut buf[6..8], self.width);
        LittleEndian::write_u16(&mut buf[8..10], self.height);
        LittleEndian::write_u16(&mut buf[10..12], self.channels);
        buf
    }

    /// Parse a header; `None` if too short or the magic does not match.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < THUMB_HEADER_LEN || buf[0..4] != THUMB_MAGIC {
            return None;
        }
        Some(Self {
            version: LittleEndian::read_u16(&buf[4..6]),
            width: LittleEndian::read_u16(&buf[6..8]),
            height: LittleEndian::read_u16(&buf[8..10]),
            channels: LittleEndian::read_u16(&buf[10..12]),
        })
    }

    /// Byte length of the payload described by this header.
    pub fn payload_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) * usize::from(self.channels)
    }
}
