//! Preview sidecars on disk.

use std::fs;

use xsnap::capture::{PREVIEW_LEN, capture_thumbnail};
use xsnap::graphics::mock::MockFrameSource;
use xsnap::sidecar::{SidecarWriter, THUMB_HEADER_LEN, read_thumbnail, read_title};

use crate::common::fixtures::TestStore;

#[test]
fn test_thumbnail_layout_on_disk() {
    let store = TestStore::new();
    let paths = store.write_preview("MyGame", "Halo");

    let bytes = fs::read(&paths.thumbnail).unwrap();
    assert_eq!(bytes.len(), 307_212);
    assert_eq!(&bytes[0..4], b"X1TH");
    // version 1, 320x240, 4 channels, little-endian
    assert_eq!(&bytes[4..12], &[1, 0, 0x40, 0x01, 0xF0, 0x00, 4, 0]);
}

#[test]
fn test_names_map_to_safe_stems() {
    let store = TestStore::new();
    let paths = store.write_preview("Halo: CE / slot 1", "Halo");

    assert_eq!(
        paths.thumbnail.file_name().unwrap().to_str(),
        Some("Halo__CE___slot_1.thm")
    );
    assert_eq!(paths.thumbnail.parent().unwrap(), store.preview_dir());
}

#[test]
fn test_resave_overwrites_previous_preview() {
    let store = TestStore::new();
    let _ = store.write_preview("slot_1", "A much longer first title");
    let paths = store.write_preview("slot_1", "Halo 2");

    assert_eq!(read_title(&paths.title).unwrap().as_deref(), Some("Halo 2"));
    assert_eq!(
        fs::metadata(&paths.thumbnail).unwrap().len(),
        (THUMB_HEADER_LEN + PREVIEW_LEN) as u64
    );
}

#[test]
fn test_captured_frame_reads_back_upright() {
    let store = TestStore::new();
    let mut frames = MockFrameSource::new(640, 480);
    let image = capture_thumbnail(&mut frames).unwrap();

    let paths = SidecarWriter::new(store.config())
        .write_preview("slot_1", "Halo", Some(&image))
        .unwrap();
    let upright = read_thumbnail(&paths.thumbnail)
        .unwrap()
        .to_rgba_image()
        .unwrap();

    // Captured rows start at the bottom of the frame, so the first captured
    // row ends up last. Mock pixels encode (x lo, x hi, y lo, y hi) and the
    // y hi byte is replaced by opaque alpha.
    assert_eq!(upright.get_pixel(0, 239).0, [0, 0, 0, 255]);
    assert_eq!(upright.get_pixel(10, 0).0, [20, 0, (478 & 0xFF) as u8, 255]);
}

#[test]
fn test_png_export() {
    let store = TestStore::new();
    let paths = store.write_preview("slot_1", "Halo");
    let png = store.path().join("slot_1.png");

    read_thumbnail(&paths.thumbnail).unwrap().export_png(&png).unwrap();

    let decoded = image::open(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (320, 240));
    assert!(decoded.pixels().all(|p| p.0[3] == 255));
}
