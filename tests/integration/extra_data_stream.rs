//! The title chunk inside a snapshot state stream.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use byteorder::{BigEndian, WriteBytesExt};
use xsnap::error::SnapError;
use xsnap::extra_data::{self, EXTRA_DATA_MAGIC, RewindReader};

use crate::common::fixtures::{TestStore, write_state_stream};

const ENGINE_STATE: &[u8] = b"\x00\x01RAM-AND-DEVICE-STATE\xFF";

fn open_at(path: &std::path::Path, offset: u64) -> RewindReader<BufReader<File>> {
    let mut file = File::open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    RewindReader::new(BufReader::new(file))
}

#[test]
fn test_chunk_after_engine_state() {
    let store = TestStore::new();
    let path = store.path().join("state.bin");
    write_state_stream(&path, ENGINE_STATE, "Halo");

    let mut reader = open_at(&path, ENGINE_STATE.len() as u64);
    let chunk = extra_data::decode(&mut reader).unwrap().unwrap();

    assert_eq!(chunk.version, 1);
    assert_eq!(chunk.declared_len, 13);
    assert_eq!(chunk.title.as_deref(), Some("Halo"));
    assert_eq!(reader.position(), 25);

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn test_stream_without_chunk_is_untouched() {
    let store = TestStore::new();
    let path = store.path().join("legacy.bin");
    std::fs::write(&path, b"OLD-STATE-TAIL").unwrap();

    let mut reader = open_at(&path, 4);
    assert!(extra_data::decode(&mut reader).unwrap().is_none());

    let mut rest = String::new();
    reader.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "STATE-TAIL");
}

#[test]
fn test_future_version_is_skipped_by_declared_length() {
    let mut stream = Vec::new();
    stream.write_u32::<BigEndian>(EXTRA_DATA_MAGIC).unwrap();
    stream.write_u32::<BigEndian>(7).unwrap();
    stream.write_u32::<BigEndian>(6).unwrap();
    stream.extend_from_slice(b"future");
    stream.extend_from_slice(b"NEXT");

    let mut reader = RewindReader::new(stream.as_slice());
    let chunk = extra_data::decode(&mut reader).unwrap().unwrap();
    assert_eq!(chunk.version, 7);
    assert!(chunk.title.is_none());

    let mut next = [0u8; 4];
    reader.read_exact(&mut next).unwrap();
    assert_eq!(&next, b"NEXT");
}

#[test]
fn test_truncated_chunk_is_an_error() {
    let mut stream = Vec::new();
    extra_data::encode(&mut stream, "Halo").unwrap();
    stream.truncate(stream.len() - 3);

    let mut reader = RewindReader::new(stream.as_slice());
    let err = extra_data::decode(&mut reader).unwrap_err();
    assert!(matches!(
        err,
        SnapError::TruncatedChunk {
            expected: 13,
            actual: 10
        }
    ));
}

#[test]
fn test_long_title_is_clamped() {
    let title = "X".repeat(300);
    let mut stream = Vec::new();
    let written = extra_data::encode(&mut stream, &title).unwrap();
    assert_eq!(written, 21 + 255);

    let mut reader = RewindReader::new(stream.as_slice());
    let chunk = extra_data::decode(&mut reader).unwrap().unwrap();
    assert_eq!(chunk.title.map(|t| t.len()), Some(255));
}
