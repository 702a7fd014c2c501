//! # Streaming transport capability.
//!
//! A [`Streaming`] adapter opens a persistent connection and delivers zero
//! or more payloads asynchronously through a [`StreamSink`] until the
//! returned [`StreamHandle`] is closed or the connection fails. A failure
//! before explicit close is reported through the sink's failure callback so
//! the manager can run the same failover path as an HTTP poll failure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::transports::Payload;

/// Callbacks wired by the manager into an open stream.
///
/// `on_payload` pushes each inbound payload into the buffer; `on_failure`
/// reports a socket error or unexpected close. Both must be cheap and
/// non-blocking (the reader task invokes them inline).
#[derive(Clone)]
pub struct StreamSink {
    pub on_payload: Arc<dyn Fn(Payload) + Send + Sync>,
    pub on_failure: Arc<dyn Fn() + Send + Sync>,
}

/// Handle to an open streaming connection, owned by the manager.
///
/// Closing consumes the handle, so exactly one close happens per open: the
/// registry hands the handle out at most once.
pub struct StreamHandle {
    cancel: CancellationToken,
    reader: JoinHandle<()>,
}

impl StreamHandle {
    pub fn new(cancel: CancellationToken, reader: JoinHandle<()>) -> Self {
        Self { cancel, reader }
    }

    /// Closes the connection: signals the reader task to stop and drop the
    /// underlying socket. Does not wait for the reader to finish.
    pub fn close(self) {
        self.cancel.cancel();
        drop(self.reader);
    }
}

/// Persistent-connection capability (streaming channels).
#[async_trait]
pub trait Streaming: Send + Sync + 'static {
    /// Opens a connection to the endpoint and starts delivering payloads
    /// into the sink.
    ///
    /// Connection-establishment failures are returned; failures after open
    /// are reported via `sink.on_failure` exactly once, after which the
    /// stream delivers nothing further.
    async fn open(&self, endpoint: &str, sink: StreamSink)
        -> Result<StreamHandle, TransportError>;
}
