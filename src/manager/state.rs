//! # Lock-guarded manager state.
//!
//! A single async mutex serializes every mutation of the registry, the
//! active-channel pointer, and the poll-loop handle, as well as the
//! activation generation counter that fences stale failure signals.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channels::Registry;

/// Handle to the active-channel polling loop. At most one exists at a time.
pub(crate) struct PollLoop {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollLoop {
    pub fn new(cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { cancel, task }
    }

    /// Signals the loop to stop. Never aborts: the loop may be the caller's
    /// own task (a poll failure stops its loop from inside a tick).
    pub fn stop(self) {
        self.cancel.cancel();
        drop(self.task);
    }
}

/// Everything the manager mutates, behind one lock.
pub(crate) struct ManagerState {
    /// Channels sorted by priority; statuses and stream handles live here.
    pub registry: Registry,
    /// Index of the active channel in the registry, if any.
    pub active: Option<usize>,
    /// The live polling loop, present iff the active channel is HTTP.
    pub poll_loop: Option<PollLoop>,
    /// Bumped on every activation; loops and sinks carry the generation they
    /// were started under, and failure signals from an older generation are
    /// ignored.
    pub generation: u64,
}

impl ManagerState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            active: None,
            poll_loop: None,
            generation: 0,
        }
    }
}
