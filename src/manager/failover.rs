//! # FailoverManager: owns channel state, decides which channel is active.
//!
//! The manager owns the [`Registry`](crate::channels::Registry), the payload
//! [`Buffer`], the event [`Bus`], and the [`SubscriberSet`]. It is the only
//! component that mutates channel status, and it serializes every mutation
//! through one async mutex.
//!
//! ## Transition ordering
//! Within [`activate_locked`](FailoverManager::activate_locked) the sequence
//! is fixed and must not be reordered — subscribers and the buffer depend on
//! status being consistent at emission time:
//!
//! ```text
//! close old stream ─► open new stream ─► mark old Idle ─► mark new Connected
//!   ─► emit StatusChange ─► stop old poll loop ─► start new poll loop (HTTP)
//! ```
//!
//! ## Failure semantics
//! Transport errors degrade a channel's status and trigger failover; they
//! never escape the public API. "No channel available" is a lifecycle event
//! carrying the sentinel (no channel), not an error return.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::buffer::Buffer;
use crate::channels::{ChannelSnapshot, ChannelSpec, ChannelStatus, TransportKind};
use crate::config::ManagerConfig;
use crate::events::{Bus, Event, EventKind};
use crate::manager::builder::ManagerBuilder;
use crate::manager::state::ManagerState;
use crate::subscribers::{Subscribe, SubscriberSet, SubscriptionId};
use crate::transports::{Payload, Pollable, Streaming};

/// Selects and maintains the active data-delivery channel.
pub struct FailoverManager {
    pub(crate) cfg: ManagerConfig,
    pub(crate) bus: Bus,
    pub(crate) subs: Arc<SubscriberSet>,
    pub(crate) buffer: Arc<Buffer>,
    pub(crate) poller: Arc<dyn Pollable>,
    pub(crate) streamer: Arc<dyn Streaming>,
    pub(crate) state: Mutex<ManagerState>,
    /// Cancels every loop and sink on stop; checked before any mutation so a
    /// stopped manager no longer changes state or emits events.
    pub(crate) runtime: CancellationToken,
    /// Back-reference for spawned loops and sinks; a failed upgrade means the
    /// manager is being dropped and the signal is discarded.
    pub(crate) weak: Weak<FailoverManager>,
    started: AtomicBool,
}

impl FailoverManager {
    /// Starts building a manager from an ordered channel list and a config.
    pub fn builder(channels: Vec<ChannelSpec>, cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(channels, cfg)
    }

    pub(crate) fn new_internal(
        cfg: ManagerConfig,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        poller: Arc<dyn Pollable>,
        streamer: Arc<dyn Streaming>,
        state: ManagerState,
        weak: Weak<FailoverManager>,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            buffer: Arc::new(Buffer::new()),
            poller,
            streamer,
            state: Mutex::new(state),
            runtime: CancellationToken::new(),
            weak,
            started: AtomicBool::new(false),
        }
    }

    /// Starts the manager: the subscriber listener, the zero-delay initial
    /// failover tick, the health-check loop, and (if configured) the
    /// failure-injection loop. Idempotent.
    ///
    /// The initial failover runs as a spawned task, so subscribers attached
    /// synchronously after `build()` still observe the first activation.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.spawn_subscriber_listener();
        self.spawn_initial_failover();
        self.spawn_health_loop();
        if let Some(period) = self.cfg.failure_injection {
            self.spawn_chaos_loop(period);
        }
    }

    /// Stops the manager: cancels all loops and closes any open streaming
    /// connection. After this returns, the manager no longer mutates the
    /// registry or emits events. Idempotent.
    pub async fn stop(&self) {
        self.runtime.cancel();
        let mut state = self.state.lock().await;
        if let Some(poll_loop) = state.poll_loop.take() {
            poll_loop.stop();
        }
        if let Some(idx) = state.active.take() {
            if let Some(conn) = state.registry.take_conn(idx) {
                conn.close();
            }
        }
    }

    // ---- Pull interface ----

    /// Snapshot of the current active channel, or `None` when no channel is
    /// available.
    pub async fn active_channel(&self) -> Option<ChannelSnapshot> {
        let state = self.state.lock().await;
        state.active.map(|idx| ChannelSnapshot {
            spec: state.registry.entry(idx).spec.clone(),
            status: state.registry.status(idx),
        })
    }

    /// Snapshots of all channels in priority order.
    pub async fn channels(&self) -> Vec<ChannelSnapshot> {
        self.state.lock().await.registry.snapshots()
    }

    /// Atomically drains and returns all buffered payloads, oldest first.
    ///
    /// This is a consuming read: a second call with no new arrivals in
    /// between returns an empty vec.
    pub fn drain_buffer(&self) -> Vec<Payload> {
        self.buffer.drain()
    }

    // ---- Subscription interface ----

    /// Registers a subscriber for all future lifecycle events.
    pub fn on_event(&self, subscriber: Arc<dyn Subscribe>) -> SubscriptionId {
        self.subs.add(subscriber)
    }

    /// Detaches a previously registered subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subs.remove(id)
    }

    // ---- Internal transitions (state lock held by caller) ----

    /// Publishes an event unless the manager has been stopped.
    pub(crate) fn emit(&self, ev: Event) {
        if self.runtime.is_cancelled() {
            return;
        }
        self.bus.publish(ev);
    }

    /// Selects a replacement active channel: first `Idle` in ascending
    /// priority order (first-fit, not load-based).
    ///
    /// On success emits `Failover` naming the replacement; when no candidate
    /// exists, emits the sentinel `Failover` and leaves no active channel.
    /// A candidate whose stream fails to open is marked `Unavailable` and
    /// the scan continues.
    pub(crate) async fn failover_locked(&self, state: &mut ManagerState) {
        loop {
            let Some(idx) = state.registry.first_idle() else {
                // No replacement: the demoted channel's poll loop must not
                // keep feeding the buffer.
                if let Some(poll_loop) = state.poll_loop.take() {
                    poll_loop.stop();
                }
                state.active = None;
                self.emit(
                    Event::new(EventKind::Failover).with_status(ChannelStatus::Unavailable),
                );
                return;
            };

            let id = state.registry.entry(idx).spec.id.clone();
            match self.activate_locked(state, idx).await {
                Ok(()) => {
                    self.emit(
                        Event::new(EventKind::Failover)
                            .with_channel(id)
                            .with_status(ChannelStatus::Connected),
                    );
                    return;
                }
                Err(err) => {
                    state.registry.set_status(idx, ChannelStatus::Unavailable);
                    let _ = err;
                }
            }
        }
    }

    /// Makes `idx` the active channel.
    ///
    /// The step order is part of the contract (see module docs). Exactly one
    /// connection open/close pair happens per transition. The previous
    /// active channel is marked `Idle` only if it is still `Connected`: a
    /// channel already demoted to `Unavailable` by a failure path keeps that
    /// status so the health-check loop can restore it.
    pub(crate) async fn activate_locked(
        &self,
        state: &mut ManagerState,
        idx: usize,
    ) -> Result<(), crate::TransportError> {
        debug_assert!(idx < state.registry.len(), "channel not in registry");

        // The new generation is committed only after the transition can no
        // longer fail, so a failed stream open does not fence out the
        // failure signals of the still-active previous channel.
        let generation = state.generation + 1;
        let spec = state.registry.entry(idx).spec.clone();

        // 1. Close the previous streaming connection, if any.
        if let Some(prev) = state.active {
            if prev != idx {
                if let Some(conn) = state.registry.take_conn(prev) {
                    conn.close();
                }
            }
        }

        // 2. Open the new connection for streaming channels, wiring inbound
        //    payloads into the buffer and failures into the failover path.
        if spec.kind == TransportKind::Streaming {
            let sink = self.make_sink(generation);
            let handle = self.streamer.open(&spec.endpoint, sink).await?;
            state.registry.set_conn(idx, handle);
        }
        state.generation = generation;

        // 3./4. Status flips: old Idle (if still Connected), new Connected.
        if let Some(prev) = state.active {
            if prev != idx && state.registry.status(prev) == ChannelStatus::Connected {
                state.registry.set_status(prev, ChannelStatus::Idle);
            }
        }
        state.registry.set_status(idx, ChannelStatus::Connected);
        state.active = Some(idx);
        debug_assert!(state.registry.connected_count() <= 1);

        // 5. Emit with status already consistent.
        self.emit(
            Event::new(EventKind::StatusChange)
                .with_channel(spec.id.clone())
                .with_status(ChannelStatus::Connected),
        );

        // 6. Restart the polling loop: stop the previous one first; at most
        //    one runs at a time.
        if let Some(poll_loop) = state.poll_loop.take() {
            poll_loop.stop();
        }
        if spec.kind == TransportKind::Http {
            state.poll_loop = Some(self.spawn_poll_loop(spec, generation));
        }

        Ok(())
    }
}
