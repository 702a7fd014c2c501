//! Error types used at the transport boundary.
//!
//! Transport adapters return [`TransportError`] values instead of letting
//! failures escape across the manager boundary. The manager converts every
//! one of them into a channel status transition; none of them is ever
//! surfaced to callers of the public API.

use thiserror::Error;

/// # Errors produced by transport adapters.
///
/// Each variant degrades the affected channel's status; the periodic loops
/// are the only retry mechanism layered on top (fixed period, no backoff).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection to a streaming endpoint could not be established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// HTTP request failed before a response was received (DNS, TCP, TLS, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// HTTP response carried a non-success status code.
    #[error("unexpected status code {0}")]
    Status(u16),

    /// Response body was not parseable into a payload unit.
    #[error("payload parse failed: {0}")]
    Parse(String),
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use chanvisor::TransportError;
    ///
    /// assert_eq!(TransportError::Status(503).as_label(), "transport_status");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Connect(_) => "transport_connect",
            TransportError::Request(_) => "transport_request",
            TransportError::Status(_) => "transport_status",
            TransportError::Parse(_) => "transport_parse",
        }
    }
}
