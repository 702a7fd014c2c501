//! # Periodic loops and asynchronous failure signals.
//!
//! Three independently-ticking loops plus the stream failure path, all
//! serialized through the manager's state lock:
//!
//! - **initial failover tick**: zero-delay, runs once at start;
//! - **health-check loop**: probes `Unavailable` HTTP channels, restores
//!   them to `Idle`, optionally preempts on priority;
//! - **active-poll loop**: polls the active HTTP channel into the buffer,
//!   demotes it on failure (spawned per activation, at most one live);
//! - **failure-injection loop**: optional chaos harness that forcibly fails
//!   the active channel on a fixed period.
//!
//! Every loop consumes the interval's first immediate tick up front and uses
//! [`MissedTickBehavior::Skip`], so a tick that fires while the previous one
//! is still probing is skipped rather than queued.
//!
//! Spawned tasks hold a `Weak` back-reference to the manager; a failed
//! upgrade means the manager is being dropped and the loop exits.

use std::sync::Arc;

use tokio::time::{self, MissedTickBehavior};

use crate::channels::{ChannelSpec, ChannelStatus};
use crate::events::{Event, EventKind};
use crate::manager::state::PollLoop;
use crate::subscribers::SubscriberSet;
use crate::transports::{ProbeOutcome, StreamSink};

use super::FailoverManager;

impl FailoverManager {
    /// Forwards bus events to the subscriber set until the manager stops.
    pub(crate) fn spawn_subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set: Arc<SubscriberSet> = Arc::clone(&self.subs);
        let token = self.runtime.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    ev = rx.recv() => match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(_) => break,
                    }
                }
            }
        });
    }

    /// The zero-delay startup tick: selects the first active channel.
    pub(crate) fn spawn_initial_failover(&self) {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let Some(mgr) = weak.upgrade() else {
                return;
            };
            if mgr.runtime.is_cancelled() {
                return;
            }
            let mut state = mgr.state.lock().await;
            mgr.failover_locked(&mut state).await;
        });
    }

    pub(crate) fn spawn_health_loop(&self) {
        let weak = self.weak.clone();
        let token = self.runtime.clone();
        let period = self.cfg.health_check_interval;
        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(mgr) = weak.upgrade() else {
                            break;
                        };
                        mgr.health_check_tick().await;
                    }
                }
            }
        });
    }

    /// One health-check pass: probe every `Unavailable` HTTP channel.
    ///
    /// The lock is not held across network probes; each restoration
    /// re-checks the channel status after re-acquiring it.
    async fn health_check_tick(&self) {
        let targets: Vec<(usize, ChannelSpec)> = {
            let state = self.state.lock().await;
            state.registry.unavailable_http()
        };

        for (idx, spec) in targets {
            match self.poller.probe(&spec.endpoint).await {
                ProbeOutcome::Reachable => {
                    if self.runtime.is_cancelled() {
                        return;
                    }
                    let mut state = self.state.lock().await;
                    if state.registry.status(idx) != ChannelStatus::Unavailable {
                        continue;
                    }
                    state.registry.set_status(idx, ChannelStatus::Idle);
                    self.emit(
                        Event::new(EventKind::Restored)
                            .with_channel(spec.id.clone())
                            .with_status(ChannelStatus::Idle),
                    );

                    if self.cfg.allow_priority_restore {
                        let preempts = match state.active {
                            None => true,
                            Some(active) => {
                                spec.priority < state.registry.entry(active).spec.priority
                            }
                        };
                        if preempts && self.activate_locked(&mut state, idx).await.is_err() {
                            state.registry.set_status(idx, ChannelStatus::Unavailable);
                            // A failed handoff has already closed the stream
                            // of a streaming active channel; route it through
                            // the standard failure path to re-converge.
                            if let Some(active) = state.active {
                                if state.registry.entry(active).spec.kind
                                    == crate::channels::TransportKind::Streaming
                                {
                                    state
                                        .registry
                                        .set_status(active, ChannelStatus::Unavailable);
                                    self.failover_locked(&mut state).await;
                                }
                            }
                        }
                    }
                }
                // Still unavailable; the next interval is the only retry.
                ProbeOutcome::Unreachable(_) => {}
            }
        }
    }

    /// Failure-injection loop: forcibly fails the active channel each period.
    pub(crate) fn spawn_chaos_loop(&self, period: std::time::Duration) {
        let weak = self.weak.clone();
        let token = self.runtime.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(mgr) = weak.upgrade() else {
                            break;
                        };
                        mgr.chaos_tick().await;
                    }
                }
            }
        });
    }

    async fn chaos_tick(&self) {
        let mut state = self.state.lock().await;
        let Some(idx) = state.active else {
            return;
        };
        let id = state.registry.entry(idx).spec.id.clone();
        if let Some(conn) = state.registry.take_conn(idx) {
            conn.close();
        }
        state.registry.set_status(idx, ChannelStatus::Unavailable);
        self.emit(
            Event::new(EventKind::Failover)
                .with_channel(id)
                .with_status(ChannelStatus::Unavailable)
                .with_reason("injected"),
        );
        self.failover_locked(&mut state).await;
    }

    /// Spawns the active-channel polling loop for an HTTP channel.
    ///
    /// The loop carries the activation generation it was started under; a
    /// failure from a stale generation is ignored by
    /// [`handle_active_failure`](Self::handle_active_failure).
    pub(crate) fn spawn_poll_loop(&self, spec: ChannelSpec, generation: u64) -> PollLoop {
        let cancel = self.runtime.child_token();
        let child = cancel.clone();
        let weak = self.weak.clone();
        let period = self.cfg.poll_interval;
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(mgr) = weak.upgrade() else {
                            break;
                        };
                        match mgr.poller.poll(&spec.endpoint).await {
                            Ok(payload) => mgr.buffer.push(payload),
                            Err(err) => {
                                mgr.handle_active_failure(generation, err.as_label()).await;
                                break;
                            }
                        }
                    }
                }
            }
        });
        PollLoop::new(cancel, task)
    }

    /// Builds the sink wired into a streaming connection at activation.
    pub(crate) fn make_sink(&self, generation: u64) -> StreamSink {
        let buffer = Arc::clone(&self.buffer);
        let weak = self.weak.clone();
        StreamSink {
            on_payload: Arc::new(move |payload| buffer.push(payload)),
            on_failure: Arc::new(move || {
                let weak = weak.clone();
                tokio::spawn(async move {
                    let Some(mgr) = weak.upgrade() else {
                        return;
                    };
                    mgr.handle_active_failure(generation, "stream_failed").await;
                });
            }),
        }
    }

    /// Common failure path for poll failures and stream failures: demote the
    /// active channel to `Unavailable` and select a replacement.
    ///
    /// `generation` fences the signal: a loop or sink belonging to an older
    /// activation cannot demote a newer active channel.
    pub(crate) async fn handle_active_failure(&self, generation: u64, reason: &str) {
        if self.runtime.is_cancelled() {
            return;
        }
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return;
        }
        let Some(idx) = state.active else {
            return;
        };
        let id = state.registry.entry(idx).spec.id.clone();
        if let Some(conn) = state.registry.take_conn(idx) {
            conn.close();
        }
        state.registry.set_status(idx, ChannelStatus::Unavailable);
        self.emit(
            Event::new(EventKind::StatusChange)
                .with_channel(id)
                .with_status(ChannelStatus::Unavailable)
                .with_reason(reason),
        );
        self.failover_locked(&mut state).await;
    }
}
