//! # Lifecycle events emitted by the failover manager.
//!
//! [`EventKind`] classifies the three transitions observers care about:
//! activation ([`StatusChange`](EventKind::StatusChange)), replacement or
//! total unavailability ([`Failover`](EventKind::Failover)), and recovery
//! ([`Restored`](EventKind::Restored)).
//!
//! Events are transient: they are not persisted and are not replayed to
//! subscribers registered after emission.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order across subscribers.
//!
//! ## Example
//! ```rust
//! use chanvisor::{ChannelStatus, Event, EventKind};
//!
//! let ev = Event::new(EventKind::Failover)
//!     .with_channel("backup-api")
//!     .with_status(ChannelStatus::Connected);
//!
//! assert_eq!(ev.kind, EventKind::Failover);
//! assert_eq!(ev.channel.as_deref(), Some("backup-api"));
//! assert!(!ev.is_sentinel());
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::channels::ChannelStatus;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A channel's status changed: it became the active channel
    /// (`Connected`), or the active channel was demoted after a transport
    /// failure (`Unavailable`).
    ///
    /// Sets:
    /// - `channel`: the subject channel
    /// - `status`: the resulting status
    /// - `reason`: transport error label (demotion only)
    StatusChange,

    /// The active channel was replaced, or no replacement exists.
    ///
    /// Sets:
    /// - `channel`: the replacement channel, the forcibly failed channel
    ///   (failure injection), or `None` — the sentinel meaning "no channel
    ///   available"
    /// - `status`: resulting status of the subject channel, or
    ///   `Unavailable` for the sentinel
    Failover,

    /// A previously unavailable channel passed a health probe.
    ///
    /// Sets:
    /// - `channel`: the recovered channel
    /// - `status`: `Idle`
    Restored,
}

/// Lifecycle event with ordering metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `channel` / `status` / `reason` are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Subject channel identity; `None` is the "no channel available" sentinel.
    pub channel: Option<Arc<str>>,
    /// Resulting status of the subject channel.
    pub status: Option<ChannelStatus>,
    /// Human-readable detail (probe outcome, transport error label, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            channel: None,
            status: None,
            reason: None,
        }
    }

    /// Attaches the subject channel identity.
    #[inline]
    pub fn with_channel(mut self, id: impl Into<Arc<str>>) -> Self {
        self.channel = Some(id.into());
        self
    }

    /// Attaches the resulting status.
    #[inline]
    pub fn with_status(mut self, status: ChannelStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// `true` for a `Failover` event carrying the "no channel available" sentinel.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind, EventKind::Failover) && self.channel.is_none()
    }
}
