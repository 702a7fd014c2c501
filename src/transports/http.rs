//! # HTTP polling adapter.
//!
//! One-shot GET against a channel endpoint. Success is a 2xx response with a
//! JSON-parseable body; everything else comes back as a classified value
//! ([`TransportError`] for polls, [`ProbeOutcome::Unreachable`] for probes).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transports::{Payload, Pollable, ProbeOutcome};

/// Default per-request timeout; the manager imposes no timeout layer of its
/// own on top of this.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reqwest-backed [`Pollable`] adapter.
pub struct HttpPoller {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPoller {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates an adapter with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpPoller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Pollable for HttpPoller {
    async fn poll(&self, endpoint: &str) -> Result<Payload, TransportError> {
        let resp = self
            .client
            .get(endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        resp.json::<Payload>()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))
    }

    async fn probe(&self, endpoint: &str) -> ProbeOutcome {
        match self.client.get(endpoint).timeout(self.timeout).send().await {
            Ok(resp) if resp.status().is_success() => ProbeOutcome::Reachable,
            Ok(resp) => ProbeOutcome::Unreachable(format!("status {}", resp.status().as_u16())),
            Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        }
    }
}
