//! Mock engine implementation for unit testing.
//!
//! Records every verb for later assertion, keeps an in-memory set of saved
//! snapshot names, and supports error injection.
//!
//! # Example
//!
//! ```rust,ignore
//! use xsnap::engine::mock::{EngineOp, MockEngine};
//! use xsnap::engine::Engine;
//!
//! let engine = MockEngine::running();
//! engine.save_state("slot_1").unwrap();
//! engine.assert_operations(&[EngineOp::Save("slot_1".into())]);
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use super::Engine;
use crate::error::{Result, SnapError};

/// Recorded engine operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOp {
    Save(String),
    Load(String),
    Delete(String),
    Stop,
    Start,
}

/// Mock VM engine.
pub struct MockEngine {
    running: AtomicBool,
    saved: Mutex<HashSet<String>>,
    operation_log: Mutex<Vec<EngineOp>>,
    error_injection: Mutex<Option<SnapError>>,
    verb_delay: Mutex<Option<Duration>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::running()
    }
}

impl MockEngine {
    /// A VM that is currently executing.
    #[must_use]
    pub fn running() -> Self {
        debug!("Creating mock engine");
        Self {
            running: AtomicBool::new(true),
            saved: Mutex::new(HashSet::new()),
            operation_log: Mutex::new(Vec::new()),
            error_injection: Mutex::new(None),
            verb_delay: Mutex::new(None),
        }
    }

    /// A VM that is paused.
    #[must_use]
    pub fn stopped() -> Self {
        let engine = Self::running();
        engine.running.store(false, Ordering::SeqCst);
        engine
    }

    /// Pretend a snapshot already exists under `name`.
    #[must_use]
    pub fn with_snapshot(self, name: &str) -> Self {
        self.saved.lock().unwrap().insert(name.to_string());
        self
    }

    /// Make every save/load/delete take at least `delay`.
    pub fn set_verb_delay(&self, delay: Duration) {
        *self.verb_delay.lock().unwrap() = Some(delay);
    }

    /// Inject an error for the next verb.
    pub fn inject_error(&self, error: SnapError) {
        *self.error_injection.lock().unwrap() = Some(error);
    }

    /// Whether a snapshot is stored under `name`.
    #[must_use]
    pub fn has_snapshot(&self, name: &str) -> bool {
        self.saved.lock().unwrap().contains(name)
    }

    // === Assertions ===

    /// Get all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<EngineOp> {
        self.operation_log.lock().unwrap().clone()
    }

    /// Assert specific operations were performed.
    ///
    /// # Panics
    ///
    /// Panics if the operations don't match.
    pub fn assert_operations(&self, expected: &[EngineOp]) {
        let actual = self.operations();
        assert_eq!(
            actual, expected,
            "Operation mismatch.\nExpected: {expected:#?}\nActual: {actual:#?}",
        );
    }

    /// Assert no operations were performed.
    ///
    /// # Panics
    ///
    /// Panics if any operations were recorded.
    pub fn assert_no_operations(&self) {
        let ops = self.operations();
        assert!(ops.is_empty(), "Expected no operations, but found: {ops:#?}");
    }

    // === Internal Helpers ===

    fn record_op(&self, op: EngineOp) {
        trace!(?op, "Recording operation");
        self.operation_log.lock().unwrap().push(op);
    }

    fn run_verb(&self, op: EngineOp) -> Result<()> {
        self.record_op(op);
        let delay = *self.verb_delay.lock().unwrap();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        match self.error_injection.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Engine for MockEngine {
    fn save_state(&self, name: &str) -> Result<()> {
        self.run_verb(EngineOp::Save(name.to_string()))?;
        if name.is_empty() {
            return Err(SnapError::engine("save", name, "snapshot name is empty"));
        }
        self.saved.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    fn load_state(&self, name: &str) -> Result<()> {
        self.run_verb(EngineOp::Load(name.to_string()))?;
        if !self.has_snapshot(name) {
            return Err(SnapError::engine("load", name, "no snapshot with this name"));
        }
        Ok(())
    }

    fn delete_state(&self, name: &str) -> Result<()> {
        self.run_verb(EngineOp::Delete(name.to_string()))?;
        if !self.saved.lock().unwrap().remove(name) {
            return Err(SnapError::engine("delete", name, "no snapshot with this name"));
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.record_op(EngineOp::Stop);
        self.running.store(false, Ordering::SeqCst);
    }

    fn start(&self) {
        self.record_op(EngineOp::Start);
        self.running.store(true, Ordering::SeqCst);
    }
}
