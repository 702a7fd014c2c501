//! # Channel descriptors.
//!
//! A channel is a named, prioritized data source reachable via HTTP polling
//! or a persistent stream. Identity, endpoint, and priority are immutable
//! after construction; only the status changes over a channel's lifetime,
//! and only the manager changes it.

use std::sync::Arc;

/// Local status of a single channel.
///
/// ```text
/// Idle ──► Connected ──► Unavailable ──► Idle ──► …
/// ```
///
/// Globally, at most one channel is `Connected` at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Eligible for activation, not currently selected.
    Idle,
    /// The active channel, currently supplying payloads into the buffer.
    Connected,
    /// Failed a poll or a stream; waiting for a successful health probe.
    Unavailable,
}

impl ChannelStatus {
    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelStatus::Idle => "idle",
            ChannelStatus::Connected => "connected",
            ChannelStatus::Unavailable => "unavailable",
        }
    }
}

/// Transport capability of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// One-shot GET polling via [`Pollable`](crate::Pollable).
    Http,
    /// Persistent connection via [`Streaming`](crate::Streaming).
    Streaming,
}

/// Immutable channel descriptor supplied at construction.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// Stable unique identity.
    pub id: Arc<str>,
    /// Human-readable display name.
    pub name: Arc<str>,
    /// Endpoint address (HTTP URL or websocket URL, per `kind`).
    pub endpoint: Arc<str>,
    /// Transport capability.
    pub kind: TransportKind,
    /// Selection precedence; lower numeric value wins.
    pub priority: u32,
}

impl ChannelSpec {
    /// Creates a new channel descriptor.
    pub fn new(
        id: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        endpoint: impl Into<Arc<str>>,
        kind: TransportKind,
        priority: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint: endpoint.into(),
            kind,
            priority,
        }
    }
}

/// Read-only view of a channel and its current status.
///
/// Returned by [`FailoverManager::active_channel`](crate::FailoverManager::active_channel)
/// and [`FailoverManager::channels`](crate::FailoverManager::channels).
#[derive(Debug, Clone)]
pub struct ChannelSnapshot {
    /// The immutable descriptor.
    pub spec: ChannelSpec,
    /// Status at the time of the snapshot.
    pub status: ChannelStatus,
}
