//! Human-mode end-to-end tests.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::fixtures::TestStore;

fn xsnap() -> Command {
    let mut cmd = Command::cargo_bin("xsnap").unwrap();
    cmd.env("RUST_LOG", "off")
        .env("NO_COLOR", "1")
        .env_remove("XSNAP_CONFIG")
        .env_remove("XSNAP_FORMAT");
    cmd
}

#[test]
fn quick_start_mentions_commands() {
    xsnap()
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"))
        .stdout(predicate::str::contains("xsnap inspect"));
}

#[test]
fn inspect_prints_size() {
    let store = TestStore::new();
    let paths = store.write_preview("slot_1", "Halo");

    xsnap()
        .arg("inspect")
        .arg(&paths.thumbnail)
        .assert()
        .success()
        .stdout(predicate::str::contains("320x240 px, 4 channels"))
        .stdout(predicate::str::contains("307200 bytes"));
}

#[test]
fn export_writes_png() {
    let store = TestStore::new();
    let paths = store.write_preview("slot_1", "Halo");
    let png = store.path().join("out.png");

    xsnap()
        .arg("export")
        .arg(&paths.thumbnail)
        .arg(&png)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    assert!(png.exists());
}

#[test]
fn title_prints_stored_title() {
    let store = TestStore::new();
    let _ = store.write_preview("MyGame", "Halo: Combat Evolved");

    xsnap()
        .env("XSNAP_BASE_DIR", store.path())
        .args(["title", "MyGame"])
        .assert()
        .success()
        .stdout("Halo: Combat Evolved\n");
}

#[test]
fn config_file_sets_store_location() {
    let store = TestStore::new();
    let _ = store.write_preview("slot_1", "Halo");
    let config = store.path().join("xsnap.toml");
    std::fs::write(
        &config,
        format!("base_dir = {:?}\n", store.path().display().to_string()),
    )
    .unwrap();

    xsnap()
        .env_remove("XSNAP_BASE_DIR")
        .arg("--config")
        .arg(&config)
        .args(["title", "slot_1"])
        .assert()
        .success()
        .stdout("Halo\n");
}

#[test]
fn invalid_thumbnail_shows_hint() {
    let store = TestStore::new();
    let bad = store.path().join("bad.thm");
    std::fs::write(&bad, b"not a thumbnail").unwrap();

    xsnap()
        .arg("inspect")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid preview file"))
        .stderr(predicate::str::contains("Hint"));
}
