//! Snapshot preview core for an emulator frontend.
//!
//! Caller threads hand save/load requests to the thread that owns the
//! emulator through a single-slot [`dispatch::SnapshotDispatcher`]. The owner
//! thread runs them via [`host::SnapshotHost`], which also captures a 320x240
//! thumbnail of the current frame and writes `<stem>.title` / `<stem>.thm`
//! sidecars for the snapshot browser. The running game's title is also
//! embedded in the state stream as a versioned extra-data chunk.
//!
//! # Modules
//!
//! - `dispatch`: blocking request hand-off between threads
//! - `host`: owner-side request execution
//! - `capture`: frame readback and nearest-neighbour downsampling
//! - `sidecar`: title/thumbnail files on disk
//! - `extra_data`: the title chunk in the state stream
//! - `engine` / `graphics` / `title`: seams to the emulator
//! - `config`, `error`, `logging`: ambient plumbing
#![forbid(unsafe_code)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod extra_data;
pub mod graphics;
pub mod host;
pub mod logging;
pub mod sidecar;
pub mod title;

pub use dispatch::{RequestKind, RequestOutcome, SnapshotDispatcher};
pub use error::{Result, SnapError};
pub use host::SnapshotHost;
