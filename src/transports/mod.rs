//! # Transport adapters.
//!
//! Two capabilities behind a uniform split:
//! - [`Pollable`]: one-shot fetch (payload poll) and reachability probe;
//! - [`Streaming`]: persistent connection delivering payloads asynchronously
//!   until closed.
//!
//! Adapters are stateless delegates invoked by the manager. Failures are
//! returned as values ([`TransportError`](crate::TransportError),
//! [`ProbeOutcome::Unreachable`]) — they never propagate across the manager
//! boundary as panics or fatal errors. The manager owns every open
//! [`StreamHandle`] and is responsible for closing it.

mod http;
mod stream;
mod ws;

pub use http::HttpPoller;
pub use stream::{StreamHandle, StreamSink, Streaming};
pub use ws::WsStreamer;

use async_trait::async_trait;

use crate::error::TransportError;

/// An opaque payload unit, buffered FIFO for downstream consumption.
///
/// The core imposes no identity or schema on payloads; any identifier needed
/// for display is the consumer's concern.
pub type Payload = serde_json::Value;

/// Outcome of a health-check probe, as a first-class classified result.
///
/// The health-check loop consumes this directly: `Unreachable` means "still
/// unavailable, retry next interval" and must never crash the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Endpoint responded with success; the channel is eligible again.
    Reachable,
    /// Endpoint unreachable or erroring; carries a short diagnostic.
    Unreachable(String),
}

/// One-shot fetch capability (HTTP channels).
#[async_trait]
pub trait Pollable: Send + Sync + 'static {
    /// Fetches one payload from the endpoint.
    ///
    /// Success means a parseable payload; every failure mode (network error,
    /// non-success status, unparseable body) is returned as a
    /// [`TransportError`]. Timeout semantics are the adapter's concern.
    async fn poll(&self, endpoint: &str) -> Result<Payload, TransportError>;

    /// Checks whether the endpoint is reachable, without consuming the body
    /// as a payload.
    async fn probe(&self, endpoint: &str) -> ProbeOutcome;
}
