//! Optional preview metadata chunk embedded in the snapshot state stream.
//!
//! The chunk directly follows the engine's own state and is written once per
//! save. Streams produced before the chunk existed simply end (or continue
//! with other data) where the chunk would be, so the decoder must be able to
//! hand back the bytes it peeked at.
//!
//! # Layout (all integers big-endian)
//!
//! ```text
//! magic         u32   0x78656d75 ("xemu")
//! version       u32   1
//! declared_len  u32   byte count of everything below
//! reserved      u32   0
//! title_len     u8    0..=255
//! title         [u8; title_len]
//! reserved      u32   0
//! ```
//!
//! A decoder that does not understand `version` still consumes exactly
//! `declared_len` bytes, so newer chunks never desynchronize the stream.

use std::io::{self, ErrorKind, Read, Write};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Result, SnapError};

/// Chunk magic.
pub const EXTRA_DATA_MAGIC: u32 = 0x7865_6d75;
/// Chunk version written by this crate.
pub const EXTRA_DATA_VERSION: u32 = 1;
/// Longest title embedded in the chunk, in bytes.
pub const MAX_CHUNK_TITLE_LEN: usize = 255;

/// Magic, version and declared length.
const PREAMBLE_LEN: usize = 12;
/// Reserved field, title length byte and trailing reserved field.
const V1_FIXED_PAYLOAD_LEN: usize = 4 + 1 + 4;
/// Largest v1 payload this crate writes; only this much is ever buffered.
const MAX_V1_PAYLOAD_LEN: u64 = (V1_FIXED_PAYLOAD_LEN + MAX_CHUNK_TITLE_LEN) as u64;

/// Decoded contents of a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraData {
    pub version: u32,
    pub declared_len: u32,
    /// Title, if the version is understood and the payload carried one.
    pub title: Option<String>,
}

/// Clamp `title` to at most [`MAX_CHUNK_TITLE_LEN`] bytes on a char boundary.
pub fn chunk_title(title: &str) -> &str {
    if title.len() <= MAX_CHUNK_TITLE_LEN {
        return title;
    }
    let mut end = MAX_CHUNK_TITLE_LEN;
    while !title.is_char_boundary(end) {
        end -= 1;
    }
    &title[..end]
}

/// Total encoded size of the chunk for `title`, preamble included.
pub fn encoded_len(title: &str) -> usize {
    PREAMBLE_LEN + V1_FIXED_PAYLOAD_LEN + chunk_title(title).len()
}

/// Append the chunk for `title` to `out`. Returns the number of bytes written.
pub fn encode<W: Write + ?Sized>(out: &mut W, title: &str) -> Result<usize> {
    let title = chunk_title(title);
    let title_len = u8::try_from(title.len()).unwrap_or(u8::MAX);
    let declared_len = u32::from(title_len) + 4 + 1 + 4;

    out.write_u32::<BigEndian>(EXTRA_DATA_MAGIC)?;
    out.write_u32::<BigEndian>(EXTRA_DATA_VERSION)?;
    out.write_u32::<BigEndian>(declared_len)?;
    out.write_u32::<BigEndian>(0)?;
    out.write_u8(title_len)?;
    out.write_all(title.as_bytes())?;
    out.write_u32::<BigEndian>(0)?;

    trace!(title_len = title.len(), declared_len, "Encoded extra-data chunk");
    Ok(PREAMBLE_LEN + declared_len as usize)
}

/// Read the chunk if the stream carries one at its current position.
///
/// Returns `Ok(None)` and leaves the stream untouched when the next bytes are
/// not the chunk magic (including a stream that ends early). Once the magic
/// matches, failing to read the declared payload is an error.
pub fn decode<R: Read>(stream: &mut RewindReader<R>) -> Result<Option<ExtraData>> {
    let mut magic = [0u8; 4];
    let got = read_up_to(stream, &mut magic)?;
    if got < magic.len() || BigEndian::read_u32(&magic) != EXTRA_DATA_MAGIC {
        stream.unread(&magic[..got]);
        debug!("No extra-data chunk in snapshot stream");
        return Ok(None);
    }

    let version = stream.read_u32::<BigEndian>()?;
    let declared_len = stream.read_u32::<BigEndian>()?;

    // Read rather than seek: the stream may not be seekable.
    let declared = u64::from(declared_len);
    let (title, consumed) = if version == EXTRA_DATA_VERSION {
        let mut payload = Vec::new();
        let buffered = stream
            .by_ref()
            .take(declared.min(MAX_V1_PAYLOAD_LEN))
            .read_to_end(&mut payload)? as u64;
        let skipped = discard(stream, declared - buffered)?;
        (parse_v1_title(&payload), buffered + skipped)
    } else {
        debug!(version, declared_len, "Skipping extra-data chunk of unknown version");
        (None, discard(stream, declared)?)
    };
    if consumed < declared {
        return Err(SnapError::TruncatedChunk {
            expected: declared_len,
            actual: usize::try_from(consumed).unwrap_or(usize::MAX),
        });
    }

    Ok(Some(ExtraData {
        version,
        declared_len,
        title,
    }))
}

fn parse_v1_title(payload: &[u8]) -> Option<String> {
    let len = usize::from(*payload.get(4)?);
    let bytes = payload.get(5..5 + len)?;
    if bytes.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}

/// Read and drop up to `len` bytes, returning how many were available.
fn discard<R: Read>(stream: &mut R, len: u64) -> io::Result<u64> {
    io::copy(&mut stream.by_ref().take(len), &mut io::sink())
}

/// Fill as much of `buf` as the stream allows; a short count means EOF.
fn read_up_to<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// A reader that can push bytes back in front of the stream.
///
/// Lets the decoder peek at a candidate magic on streams that cannot seek.
pub struct RewindReader<R> {
    inner: R,
    pending: Vec<u8>,
    cursor: usize,
    position: u64,
}

impl<R: Read> RewindReader<R> {
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            cursor: 0,
            position: 0,
        }
    }

    /// Logical read position, counting pushed-back bytes as unread.
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Push `bytes` back so the next read returns them first.
    pub fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let mut pending = Vec::with_capacity(bytes.len() + self.pending.len() - self.cursor);
        pending.extend_from_slice(bytes);
        pending.extend_from_slice(&self.pending[self.cursor..]);
        self.pending = pending;
        self.cursor = 0;
        self.position = self.position.saturating_sub(bytes.len() as u64);
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for RewindReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = if self.cursor < self.pending.len() {
            let n = (self.pending.len() - self.cursor).min(buf.len());
            buf[..n].copy_from_slice(&self.pending[self.cursor..self.cursor + n]);
            self.cursor += n;
            if self.cursor == self.pending.len() {
                self.pending.clear();
                self.cursor = 0;
            }
            n
        } else {
            self.inner.read(buf)?
        };
        self.position += n as u64;
        Ok(n)
    }
}
