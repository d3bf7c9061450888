//! Engine abstraction for the VM's checkpoint machinery.
//!
//! The emulator core implements [`Engine`]; everything in this crate drives
//! it through the trait so the owner-thread logic can be tested with
//! [`mock::MockEngine`].
//!
//! # Implementation Notes
//!
//! - All verbs are only ever invoked from the owner thread
//! - Verbs report failure with a descriptive [`SnapError::Engine`]
//!
//! [`SnapError::Engine`]: crate::error::SnapError::Engine

pub mod mock;

use std::sync::Arc;

use crate::error::Result;

/// Checkpoint and run-state verbs exposed by the VM.
pub trait Engine {
    /// Write a snapshot of the full machine state under `name`.
    fn save_state(&self, name: &str) -> Result<()>;

    /// Restore the snapshot stored under `name`. The VM is expected to be
    /// stopped while this runs.
    fn load_state(&self, name: &str) -> Result<()>;

    /// Delete the snapshot stored under `name`.
    fn delete_state(&self, name: &str) -> Result<()>;

    /// Whether the VM is currently executing.
    fn is_running(&self) -> bool;

    /// Stop VM execution for a state restore.
    fn stop(&self);

    /// Resume VM execution.
    fn start(&self);
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn save_state(&self, name: &str) -> Result<()> {
        (**self).save_state(name)
    }

    fn load_state(&self, name: &str) -> Result<()> {
        (**self).load_state(name)
    }

    fn delete_state(&self, name: &str) -> Result<()> {
        (**self).delete_state(name)
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn stop(&self) {
        (**self).stop();
    }

    fn start(&self) {
        (**self).start();
    }
}
