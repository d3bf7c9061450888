//! Owner-thread side of snapshot requests.
//!
//! [`SnapshotHost`] owns the engine handle, the graphics context and the
//! title source, and runs requests drained from a [`SnapshotDispatcher`].
//! Preview generation after a save is best-effort: its result is logged and
//! recorded in [`RequestOutcome::preview_ok`], never in the save's success.

use std::io::Write;

use tracing::{info, instrument, warn};

use crate::capture::capture_thumbnail;
use crate::config::StoreConfig;
use crate::dispatch::{RequestHandler, RequestKind, RequestOutcome, SnapshotDispatcher, SnapshotRequest};
use crate::engine::Engine;
use crate::error::Result;
use crate::extra_data;
use crate::graphics::FrameSource;
use crate::sidecar::{SidecarPaths, SidecarWriter};
use crate::title::{TitleSource, resolve_title};

/// Runs snapshot verbs and preview generation on the owner thread.
pub struct SnapshotHost<E, F, T> {
    engine: E,
    frames: F,
    titles: T,
    writer: SidecarWriter,
    dirty: bool,
}

impl<E, F, T> SnapshotHost<E, F, T>
where
    E: Engine,
    F: FrameSource,
    T: TitleSource,
{
    pub fn new(engine: E, frames: F, titles: T, config: StoreConfig) -> Self {
        Self {
            engine,
            frames,
            titles,
            writer: SidecarWriter::new(config),
            dirty: true,
        }
    }

    /// Run the pending request from `dispatcher`, if any.
    ///
    /// Call once per frame or tick from the owner thread's loop.
    pub fn poll(&mut self, dispatcher: &SnapshotDispatcher) -> Option<RequestOutcome> {
        dispatcher.drain(self)
    }

    /// Save a snapshot, then write its preview sidecars.
    #[instrument(skip(self))]
    pub fn save(&mut self, name: &str) -> RequestOutcome {
        let saved = self.engine.save_state(name);
        self.dirty = true;
        if let Err(e) = saved {
            warn!(error = %e, "Snapshot save failed");
            return RequestOutcome::failed();
        }

        let preview_ok = match self.write_preview(name) {
            Ok(paths) => {
                info!(thumbnail = %paths.thumbnail.display(), "Snapshot saved with preview");
                true
            }
            Err(e) => {
                warn!(error = %e, "Snapshot saved without preview");
                false
            }
        };

        RequestOutcome {
            primary_ok: true,
            preview_ok,
        }
    }

    /// Restore a snapshot. The VM is stopped around the restore and resumed
    /// only if it was running and the restore succeeded.
    #[instrument(skip(self))]
    pub fn load(&mut self, name: &str) -> RequestOutcome {
        let was_running = self.engine.is_running();
        self.engine.stop();

        match self.engine.load_state(name) {
            Ok(()) => {
                if was_running {
                    self.engine.start();
                }
                info!(resumed = was_running, "Snapshot loaded");
                RequestOutcome {
                    primary_ok: true,
                    preview_ok: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Snapshot load failed");
                RequestOutcome::failed()
            }
        }
    }

    /// Delete a snapshot. Its preview sidecars are left in place.
    #[instrument(skip(self))]
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let result = self.engine.delete_state(name);
        self.dirty = true;
        result
    }

    /// Capture the current frame and write both sidecars for `name`.
    pub fn write_preview(&mut self, name: &str) -> Result<SidecarPaths> {
        let title = self.current_title();
        let image = capture_thumbnail(&mut self.frames);
        self.writer.write_preview(name, &title, image.as_ref())
    }

    /// Append the extra-data chunk for the running game to a state stream.
    ///
    /// Called by the engine right after it has written its own state.
    pub fn save_extra_data<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<usize> {
        let title = self.current_title();
        let written = extra_data::encode(out, &title)?;
        self.dirty = true;
        Ok(written)
    }

    /// Title of the running game, or the configured fallback.
    pub fn current_title(&self) -> String {
        resolve_title(&self.titles, &self.writer.config().unknown_title)
    }

    /// Whether snapshots changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Mark the snapshot list as changed by something outside this host.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub const fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }
}

impl<E, F, T> RequestHandler for SnapshotHost<E, F, T>
where
    E: Engine,
    F: FrameSource,
    T: TitleSource,
{
    fn handle(&mut self, request: &SnapshotRequest) -> RequestOutcome {
        match request.kind {
            RequestKind::Save => self.save(&request.name),
            RequestKind::Load => self.load(&request.name),
        }
    }
}
