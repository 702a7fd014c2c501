//! # Channel registry.
//!
//! Fixed-membership set of channels, kept sorted ascending by priority so
//! that failover selection is a linear first-fit scan. Pure bookkeeping: the
//! registry never talks to transports and never emits events.
//!
//! ## Rules
//! - Membership is fixed at construction (no dynamic add/remove).
//! - Statuses are mutated exclusively by the manager, under its state lock.
//! - A live stream handle exists only for a streaming channel while it is
//!   the active channel; the registry stores it so deactivation can close
//!   exactly one handle.

use crate::channels::spec::{ChannelSnapshot, ChannelSpec, ChannelStatus, TransportKind};
use crate::transports::StreamHandle;

/// One channel plus its mutable runtime state.
pub(crate) struct Entry {
    pub spec: ChannelSpec,
    pub status: ChannelStatus,
    /// Live connection handle; `Some` only while a streaming channel is active.
    conn: Option<StreamHandle>,
}

/// Priority-ordered set of channels.
pub(crate) struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Builds the registry, sorting ascending by priority. All channels
    /// start `Idle`.
    pub fn new(mut specs: Vec<ChannelSpec>) -> Self {
        specs.sort_by_key(|s| s.priority);
        let entries = specs
            .into_iter()
            .map(|spec| Entry {
                spec,
                status: ChannelStatus::Idle,
                conn: None,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, idx: usize) -> &Entry {
        &self.entries[idx]
    }

    pub fn status(&self, idx: usize) -> ChannelStatus {
        self.entries[idx].status
    }

    pub fn set_status(&mut self, idx: usize, status: ChannelStatus) {
        self.entries[idx].status = status;
    }

    /// Index of the first `Idle` channel in priority order (first-fit policy).
    pub fn first_idle(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.status == ChannelStatus::Idle)
    }

    /// Indices and specs of every `Unavailable` HTTP channel, for the
    /// health-check loop. Streaming channels are not probed; their liveness
    /// is observed through their own connection lifecycle.
    pub fn unavailable_http(&self) -> Vec<(usize, ChannelSpec)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.status == ChannelStatus::Unavailable && e.spec.kind == TransportKind::Http
            })
            .map(|(i, e)| (i, e.spec.clone()))
            .collect()
    }

    /// Stores the live connection handle for a just-activated streaming channel.
    pub fn set_conn(&mut self, idx: usize, handle: StreamHandle) {
        debug_assert!(self.entries[idx].conn.is_none(), "connection handle leak");
        self.entries[idx].conn = Some(handle);
    }

    /// Takes the live connection handle, if any. Returns `None` on a second
    /// take, which makes deactivation close exactly one handle.
    pub fn take_conn(&mut self, idx: usize) -> Option<StreamHandle> {
        self.entries[idx].conn.take()
    }

    /// Number of channels currently `Connected`. Invariant: 0 or 1.
    pub fn connected_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == ChannelStatus::Connected)
            .count()
    }

    pub fn snapshots(&self) -> Vec<ChannelSnapshot> {
        self.entries
            .iter()
            .map(|e| ChannelSnapshot {
                spec: e.spec.clone(),
                status: e.status,
            })
            .collect()
    }
}
