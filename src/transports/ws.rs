//! # Websocket streaming adapter.
//!
//! Opens a websocket to the channel endpoint and parses each inbound text or
//! binary message independently as one JSON payload. A read error or an
//! unexpected close (server-initiated, not via [`StreamHandle::close`])
//! fires the sink's failure callback exactly once, feeding the manager's
//! failover path.
//!
//! Messages that fail to parse are skipped rather than treated as a
//! connection failure: the stream itself is still live.

use async_trait::async_trait;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::transports::{StreamHandle, StreamSink, Streaming};

/// Tungstenite-backed [`Streaming`] adapter.
#[derive(Default)]
pub struct WsStreamer;

impl WsStreamer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Streaming for WsStreamer {
    async fn open(
        &self,
        endpoint: &str,
        sink: StreamSink,
    ) -> Result<StreamHandle, TransportError> {
        let (socket, _resp) = connect_async(endpoint)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let cancel = CancellationToken::new();
        let child = cancel.clone();

        let reader = tokio::spawn(async move {
            let (_write, mut read) = socket.split();
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Ok(payload) = serde_json::from_str(&text) {
                                (sink.on_payload)(payload);
                            }
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            if let Ok(payload) = serde_json::from_slice(&bytes) {
                                (sink.on_payload)(payload);
                            }
                        }
                        // Ping/pong/frame bookkeeping handled by tungstenite.
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => {
                            (sink.on_failure)();
                            break;
                        }
                    }
                }
            }
        });

        Ok(StreamHandle::new(cancel, reader))
    }
}
