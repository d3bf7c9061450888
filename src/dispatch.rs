//! Single-slot hand-off of snapshot requests to the owner thread.
//!
//! Any thread may call [`SnapshotDispatcher::submit`]; it blocks until the
//! thread that owns the engine and the graphics context picks the request
//! up from its scheduling loop via [`SnapshotDispatcher::drain`].
//!
//! ```text
//! caller thread                     owner thread (per frame)
//! ─────────────                     ────────────────────────
//! submit("slot_1", Save)
//!   wait for vacant slot
//!   fill slot, pending = true
//!   wait on `done` ───────────┐     drain(handler)
//!                             │       try_lock (never blocks)
//!                             │       handler.handle(request)
//!                             └────── done = true, notify
//!   take success, free slot
//! ```
//!
//! The slot holds one request. A second caller waits for the slot to become
//! vacant before writing into it, so an in-flight request is never
//! overwritten. The untimed `submit` has no cancellation: if the owner stops
//! polling, the caller never returns.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

/// Longest snapshot name carried by a request, in bytes.
pub const MAX_NAME_LEN: usize = 127;

/// Kind of snapshot operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Save,
    Load,
}

/// A request as seen by the owner thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub kind: RequestKind,
    pub name: String,
}

/// Owner-side result of one request.
///
/// Only `primary_ok` is reported to the caller; `preview_ok` records whether
/// the best-effort preview sidecars were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RequestOutcome {
    pub primary_ok: bool,
    pub preview_ok: bool,
}

impl RequestOutcome {
    pub const fn failed() -> Self {
        Self {
            primary_ok: false,
            preview_ok: false,
        }
    }
}

/// Caller-side result of a timed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The owner ran the request; carries its success flag.
    Completed(bool),
    /// The deadline passed before the owner picked the request up. The
    /// request was withdrawn and will not run.
    TimedOut,
}

/// Executes requests on the owner thread.
pub trait RequestHandler {
    fn handle(&mut self, request: &SnapshotRequest) -> RequestOutcome;
}

impl<F> RequestHandler for F
where
    F: FnMut(&SnapshotRequest) -> RequestOutcome,
{
    fn handle(&mut self, request: &SnapshotRequest) -> RequestOutcome {
        self(request)
    }
}

/// Cut `name` at the first NUL and bound it to [`MAX_NAME_LEN`] bytes on a
/// char boundary.
pub fn bounded_name(name: &str) -> &str {
    let name = name.split('\0').next().unwrap_or_default();
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[derive(Debug, Default)]
struct Slot {
    /// `None` while the slot is vacant.
    kind: Option<RequestKind>,
    name: String,
    pending: bool,
    done: bool,
    success: bool,
}

impl Slot {
    fn vacate(&mut self) {
        self.kind = None;
        self.name.clear();
        self.pending = false;
        self.done = false;
    }
}

/// The shared request slot.
///
/// Construct once when the owner thread starts and hand an `Arc` to every
/// caller.
#[derive(Debug, Default)]
pub struct SnapshotDispatcher {
    slot: Mutex<Slot>,
    /// Signalled when the in-flight request completes.
    done: Condvar,
    /// Signalled when the slot becomes vacant.
    vacant: Condvar,
}

impl SnapshotDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a snapshot under `name`, blocking until the owner has run it.
    pub fn request_save(&self, name: &str) -> bool {
        self.submit(name, RequestKind::Save)
    }

    /// Load the snapshot stored under `name`, blocking until the owner has
    /// run it.
    pub fn request_load(&self, name: &str) -> bool {
        self.submit(name, RequestKind::Load)
    }

    /// Submit a request and block until the owner thread has executed it.
    ///
    /// An empty name is a no-op success: nothing is queued and the engine is
    /// never called.
    pub fn submit(&self, name: &str, kind: RequestKind) -> bool {
        match self.submit_until(name, kind, None) {
            SubmitOutcome::Completed(success) => success,
            SubmitOutcome::TimedOut => false,
        }
    }

    /// Like [`Self::submit`], but give up after `timeout`.
    ///
    /// The timeout covers both waiting for a vacant slot and waiting for the
    /// owner to pick the request up. A request the owner has already started
    /// always runs to completion and is reported as `Completed`.
    pub fn submit_timeout(&self, name: &str, kind: RequestKind, timeout: Duration) -> SubmitOutcome {
        self.submit_until(name, kind, Some(Instant::now() + timeout))
    }

    fn submit_until(&self, name: &str, kind: RequestKind, deadline: Option<Instant>) -> SubmitOutcome {
        let name = bounded_name(name);
        if name.is_empty() {
            debug!(?kind, "Empty snapshot name, nothing to do");
            return SubmitOutcome::Completed(true);
        }

        let mut slot = self.lock_slot();
        while slot.kind.is_some() {
            let (guard, expired) = wait(&self.vacant, slot, deadline);
            slot = guard;
            if expired && slot.kind.is_some() {
                warn!(?kind, name, "Timed out waiting for the request slot");
                return SubmitOutcome::TimedOut;
            }
        }

        slot.kind = Some(kind);
        slot.name.clear();
        slot.name.push_str(name);
        slot.pending = true;
        slot.done = false;
        slot.success = false;
        info!(?kind, name, "Snapshot request submitted");

        while !slot.done {
            let (guard, expired) = wait(&self.done, slot, deadline);
            slot = guard;
            if expired && !slot.done {
                // The owner holds the lock for the whole request, so a
                // request still pending here has not started.
                slot.vacate();
                self.vacant.notify_all();
                warn!(?kind, name, "Snapshot request timed out before it was run");
                return SubmitOutcome::TimedOut;
            }
        }

        let success = slot.success;
        slot.vacate();
        self.vacant.notify_all();
        debug!(?kind, name, success, "Snapshot request completed");
        SubmitOutcome::Completed(success)
    }

    /// Run the pending request, if any. Call from the owner thread's loop.
    ///
    /// Never blocks: if the slot lock is held by a caller, or nothing is
    /// pending, returns `None` immediately. Otherwise runs the request
    /// through `handler`, wakes the waiting caller and returns the outcome.
    pub fn drain<H: RequestHandler + ?Sized>(&self, handler: &mut H) -> Option<RequestOutcome> {
        let mut slot = match self.slot.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return None,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        if !slot.pending {
            return None;
        }
        let Some(kind) = slot.kind else {
            slot.pending = false;
            return None;
        };

        let request = SnapshotRequest {
            kind,
            name: slot.name.clone(),
        };
        let outcome = handler.handle(&request);

        slot.success = outcome.primary_ok;
        slot.done = true;
        slot.pending = false;
        self.done.notify_one();
        Some(outcome)
    }

    /// Whether a request is waiting for the owner thread.
    pub fn is_pending(&self) -> bool {
        self.lock_slot().pending
    }

    /// The request currently occupying the slot, if any.
    pub fn current_request(&self) -> Option<SnapshotRequest> {
        let slot = self.lock_slot();
        slot.kind.map(|kind| SnapshotRequest {
            kind,
            name: slot.name.clone(),
        })
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Wait on `cv` until notified or `deadline`. The flag is true when the
/// deadline had already passed and no wait happened.
fn wait<'a>(
    cv: &Condvar,
    guard: MutexGuard<'a, Slot>,
    deadline: Option<Instant>,
) -> (MutexGuard<'a, Slot>, bool) {
    match deadline {
        None => (cv.wait(guard).unwrap_or_else(PoisonError::into_inner), false),
        Some(deadline) => {
            let now = Instant::now();
            if now >= deadline {
                return (guard, true);
            }
            let (guard, _) = cv
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            (guard, false)
        }
    }
}
