//! # chanvisor
//!
//! **Chanvisor** selects and maintains one *active* data-delivery channel out
//! of a prioritized pool of candidates (HTTP-polled endpoints or persistent
//! websocket connections). It fails over to a lower-priority channel when the
//! active one becomes unavailable, restores higher-priority channels when
//! they recover, buffers inbound payloads for pull-based consumption, and
//! emits lifecycle events to subscribers.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ChannelSpec  │   │ ChannelSpec  │   │ ChannelSpec  │
//!     │ (priority 1) │   │ (priority 2) │   │ (priority 3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  FailoverManager                                                  │
//! │  - Registry (channels sorted by priority, at most one Connected)  │
//! │  - health-check loop (probes Unavailable HTTP channels)           │
//! │  - active-poll loop (polls the active HTTP channel)               │
//! │  - failure-injection loop (optional chaos harness)                │
//! │  - Buffer (FIFO of payloads, drained by pull)                     │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        │ payloads                                     │ events
//!        ▼                                              ▼
//!   ┌──────────┐                          ┌──────────────────────────┐
//!   │  Buffer  │ ◄── drain_buffer()       │ Bus (broadcast channel)  │
//!   └──────────┘                          └────────────┬─────────────┘
//!                                                      ▼
//!                                               SubscriberSet
//!                                          (per-subscriber queues)
//!                                           ▼         ▼         ▼
//!                                       sub1.on   sub2.on   subN.on
//!                                       _event()  _event()  _event()
//! ```
//!
//! ## Lifecycle
//! ```text
//! start()
//!   ├─► zero-delay failover tick: first Idle channel by priority → activate
//!   ├─► health-check loop: Unavailable + Http → probe
//!   │        Reachable ──► Idle, emit Restored
//!   │                      └─ allow_priority_restore && (better priority
//!   │                         or no active channel) ──► activate (preempt)
//!   └─► failure-injection loop (if configured):
//!            active ──► Unavailable, emit Failover, run failover()
//!
//! activate(channel)        (fixed order, never reordered)
//!   close old stream ─► open new stream ─► old Idle ─► new Connected
//!   ─► emit StatusChange ─► restart poll loop (HTTP only)
//!
//! poll failure / stream failure
//!   active ──► Unavailable ──► failover()
//!       ├─ Idle candidate found ──► activate, emit Failover(new)
//!       └─ none ──► emit Failover(sentinel), no active channel
//! ```
//!
//! ## Failure semantics
//! Transport errors (poll, probe, stream open/read) are always recovered
//! locally into a status transition. The only hard failure state is "no
//! channel available", represented as an [`EventKind::Failover`] event with
//! no channel attached, never as an error return.
//!
//! ## Example
//! ```no_run
//! use chanvisor::{ChannelSpec, FailoverManager, ManagerConfig, TransportKind};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let channels = vec![
//!         ChannelSpec::new("jokes", "Joke API", "https://example.com/jokes", TransportKind::Http, 1),
//!         ChannelSpec::new("users", "User API", "https://example.com/users", TransportKind::Http, 2),
//!     ];
//!
//!     let mut cfg = ManagerConfig::default();
//!     cfg.allow_priority_restore = true;
//!
//!     let mgr = FailoverManager::builder(channels, cfg).build();
//!     mgr.start();
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     for payload in mgr.drain_buffer() {
//!         println!("{payload}");
//!     }
//!     mgr.stop().await;
//! }
//! ```

mod buffer;
mod channels;
mod config;
mod error;
mod events;
mod manager;
mod payloads;
mod subscribers;
mod transports;

// ---- Public re-exports ----

pub use buffer::Buffer;
pub use channels::{ChannelSnapshot, ChannelSpec, ChannelStatus, TransportKind};
pub use config::ManagerConfig;
pub use error::TransportError;
pub use events::{Bus, Event, EventKind};
pub use manager::{FailoverManager, ManagerBuilder};
pub use payloads::{Joke, RandomUser, RandomUserName, RandomUserPage, RandomUserPicture};
pub use subscribers::{Subscribe, SubscriberSet, SubscriptionId};
pub use transports::{
    HttpPoller, Payload, Pollable, ProbeOutcome, StreamHandle, StreamSink, Streaming, WsStreamer,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
