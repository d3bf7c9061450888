//! Caller threads submitting requests to an owner-thread loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use xsnap::config::StoreConfig;
use xsnap::dispatch::{RequestKind, SnapshotDispatcher, SubmitOutcome};
use xsnap::engine::Engine;
use xsnap::engine::mock::{EngineOp, MockEngine};
use xsnap::graphics::mock::MockFrameSource;
use xsnap::host::SnapshotHost;
use xsnap::sidecar::{read_thumbnail, read_title};
use xsnap::title::StaticTitle;

use crate::common::fixtures::TestStore;
use crate::common::init_test_logging;

/// Run `callers` against an owner loop that polls until they all return.
fn with_owner_loop<R>(
    engine: Arc<MockEngine>,
    config: StoreConfig,
    callers: impl FnOnce(&SnapshotDispatcher) -> R,
) -> R {
    let dispatcher = SnapshotDispatcher::new();
    let finished = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            let mut host = SnapshotHost::new(
                engine,
                MockFrameSource::new(1280, 720),
                StaticTitle::new("Halo"),
                config,
            );
            while !finished.load(Ordering::SeqCst) {
                host.poll(&dispatcher);
                thread::sleep(Duration::from_millis(1));
            }
        });

        let result = callers(&dispatcher);
        finished.store(true, Ordering::SeqCst);
        result
    })
}

#[test]
fn test_save_from_caller_thread_writes_preview() {
    init_test_logging();
    let store = TestStore::new();
    let engine = Arc::new(MockEngine::running());

    let ok = with_owner_loop(Arc::clone(&engine), store.config(), |d| {
        d.request_save("MyGame")
    });

    assert!(ok);
    assert!(engine.has_snapshot("MyGame"));

    let dir = store.preview_dir();
    assert_eq!(
        read_title(&dir.join("MyGame.title")).unwrap().as_deref(),
        Some("Halo")
    );
    let thumb = read_thumbnail(&dir.join("MyGame.thm")).unwrap();
    assert_eq!((thumb.header.width, thumb.header.height), (320, 240));
}

#[test]
fn test_concurrent_callers_are_all_served() {
    init_test_logging();
    let store = TestStore::new();
    let engine = Arc::new(MockEngine::running());
    engine.set_verb_delay(Duration::from_millis(5));

    let results = with_owner_loop(Arc::clone(&engine), store.config(), |d| {
        thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| s.spawn(move || d.request_save(&format!("slot_{i}"))))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        })
    });

    assert_eq!(results, vec![true; 4]);
    for i in 0..4 {
        let name = format!("slot_{i}");
        assert!(engine.has_snapshot(&name), "{name} was not saved");
        assert!(store.preview_dir().join(format!("{name}.thm")).exists());
    }
    let saves = engine
        .operations()
        .iter()
        .filter(|op| matches!(op, EngineOp::Save(_)))
        .count();
    assert_eq!(saves, 4);
}

#[test]
fn test_save_then_load_round_trip() {
    init_test_logging();
    let store = TestStore::new();
    let engine = Arc::new(MockEngine::running());

    let (saved, loaded, missing) = with_owner_loop(Arc::clone(&engine), store.config(), |d| {
        (
            d.request_save("slot_1"),
            d.request_load("slot_1"),
            d.request_load("never_saved"),
        )
    });

    assert!(saved);
    assert!(loaded);
    assert!(!missing);
    // The failed load leaves the VM stopped.
    assert!(!engine.is_running());
    assert_eq!(
        engine.operations(),
        vec![
            EngineOp::Save("slot_1".into()),
            EngineOp::Stop,
            EngineOp::Load("slot_1".into()),
            EngineOp::Start,
            EngineOp::Stop,
            EngineOp::Load("never_saved".into()),
        ]
    );
}

#[test]
fn test_empty_name_never_reaches_engine() {
    init_test_logging();
    let store = TestStore::new();
    let engine = Arc::new(MockEngine::running());

    let ok = with_owner_loop(Arc::clone(&engine), store.config(), |d| d.request_save(""));

    assert!(ok);
    engine.assert_no_operations();
    assert!(!store.preview_dir().exists());
}

#[test]
fn test_timeout_without_owner_withdraws_request() {
    init_test_logging();
    let dispatcher = SnapshotDispatcher::new();

    let outcome = dispatcher.submit_timeout("slot_1", RequestKind::Save, Duration::from_millis(20));

    assert_eq!(outcome, SubmitOutcome::TimedOut);
    assert!(!dispatcher.is_pending());
    assert!(dispatcher.current_request().is_none());
}
