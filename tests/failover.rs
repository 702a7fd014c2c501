//! End-to-end failover scenarios driven by fake transports under a paused
//! tokio clock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use chanvisor::{
    ChannelSpec, ChannelStatus, Event, EventKind, FailoverManager, ManagerConfig, Payload,
    Pollable, ProbeOutcome, StreamHandle, StreamSink, Streaming, Subscribe, TransportError,
    TransportKind,
};

// ---- Fakes ----

#[derive(Default)]
struct FakePoller {
    /// Endpoints that poll successfully, with the payload they return.
    ok: Mutex<HashMap<String, Value>>,
    /// Endpoints that answer health probes.
    reachable: Mutex<HashSet<String>>,
}

impl FakePoller {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set_ok(&self, endpoint: &str, payload: Value) {
        self.ok.lock().unwrap().insert(endpoint.into(), payload);
        self.reachable.lock().unwrap().insert(endpoint.into());
    }

    fn set_down(&self, endpoint: &str) {
        self.ok.lock().unwrap().remove(endpoint);
        self.reachable.lock().unwrap().remove(endpoint);
    }

    fn set_reachable(&self, endpoint: &str) {
        self.reachable.lock().unwrap().insert(endpoint.into());
    }
}

#[async_trait]
impl Pollable for FakePoller {
    async fn poll(&self, endpoint: &str) -> Result<Payload, TransportError> {
        self.ok
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .ok_or(TransportError::Status(503))
    }

    async fn probe(&self, endpoint: &str) -> ProbeOutcome {
        if self.reachable.lock().unwrap().contains(endpoint) {
            ProbeOutcome::Reachable
        } else {
            ProbeOutcome::Unreachable("unreachable".into())
        }
    }
}

#[derive(Default)]
struct FakeStreamer {
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    /// Sink of the most recently opened connection, for driving payloads and
    /// failures from the test.
    sink: Mutex<Option<StreamSink>>,
}

impl FakeStreamer {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn sink(&self) -> StreamSink {
        self.sink.lock().unwrap().clone().expect("no open stream")
    }
}

#[async_trait]
impl Streaming for FakeStreamer {
    async fn open(&self, _endpoint: &str, sink: StreamSink) -> Result<StreamHandle, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock().unwrap() = Some(sink);

        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let closed = Arc::clone(&self.closed);
        let reader = tokio::spawn(async move {
            child.cancelled().await;
            closed.fetch_add(1, Ordering::SeqCst);
        });
        Ok(StreamHandle::new(cancel, reader))
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn has(&self, kind: EventKind, channel: Option<&str>) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.kind == kind && e.channel.as_deref() == channel)
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

// ---- Helpers ----

fn http(id: &str, priority: u32) -> ChannelSpec {
    ChannelSpec::new(
        id,
        id,
        format!("https://{id}.example/data"),
        TransportKind::Http,
        priority,
    )
}

fn streaming(id: &str, priority: u32) -> ChannelSpec {
    ChannelSpec::new(
        id,
        id,
        format!("wss://{id}.example/feed"),
        TransportKind::Streaming,
        priority,
    )
}

fn endpoint(id: &str) -> String {
    format!("https://{id}.example/data")
}

fn test_config() -> ManagerConfig {
    let mut cfg = ManagerConfig::default();
    cfg.poll_interval = Duration::from_millis(100);
    cfg.health_check_interval = Duration::from_secs(1);
    cfg
}

/// Lets spawned loops and event workers run (the clock is paused, so this
/// only advances virtual time).
async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
}

async fn connected_count(mgr: &FailoverManager) -> usize {
    mgr.channels()
        .await
        .iter()
        .filter(|c| c.status == ChannelStatus::Connected)
        .count()
}

async fn status_of(mgr: &FailoverManager, id: &str) -> ChannelStatus {
    mgr.channels()
        .await
        .iter()
        .find(|c| &*c.spec.id == id)
        .expect("unknown channel")
        .status
}

// ---- Scenarios ----

#[tokio::test(start_paused = true)]
async fn initial_activation_picks_highest_priority() {
    let poller = FakePoller::new();
    poller.set_ok(&endpoint("primary"), json!({"n": 1}));
    poller.set_ok(&endpoint("backup"), json!({"n": 2}));

    let recorder = Recorder::new();
    let mgr = FailoverManager::builder(vec![http("backup", 2), http("primary", 1)], test_config())
        .with_poller(poller)
        .with_subscribers(vec![recorder.clone()])
        .build();
    mgr.start();
    settle(5).await;

    let active = mgr.active_channel().await.expect("a channel is active");
    assert_eq!(&*active.spec.id, "primary");
    assert_eq!(active.status, ChannelStatus::Connected);
    assert_eq!(connected_count(&mgr).await, 1);

    assert!(recorder.has(EventKind::StatusChange, Some("primary")));
    assert!(recorder.has(EventKind::Failover, Some("primary")));
    assert!(!recorder.has(EventKind::Failover, None));

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn poll_failure_fails_over_and_buffers_from_replacement() {
    let poller = FakePoller::new();
    // primary never answers; backup serves payloads.
    poller.set_ok(&endpoint("backup"), json!({"src": "backup"}));

    let recorder = Recorder::new();
    let mgr = FailoverManager::builder(vec![http("primary", 1), http("backup", 2)], test_config())
        .with_poller(poller)
        .with_subscribers(vec![recorder.clone()])
        .build();
    mgr.start();

    // First poll tick of primary at +100ms fails.
    settle(150).await;
    assert_eq!(status_of(&mgr, "primary").await, ChannelStatus::Unavailable);
    let active = mgr.active_channel().await.unwrap();
    assert_eq!(&*active.spec.id, "backup");
    assert!(recorder.has(EventKind::Failover, Some("backup")));
    assert_eq!(connected_count(&mgr).await, 1);

    // Backup's poll loop delivers into the buffer.
    settle(250).await;
    let drained = mgr.drain_buffer();
    assert!(!drained.is_empty());
    assert!(drained.iter().all(|p| p == &json!({"src": "backup"})));

    // Drain is consuming.
    assert!(mgr.drain_buffer().is_empty());

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn total_unavailability_emits_sentinel_and_restore_is_passive() {
    let poller = FakePoller::new();

    let recorder = Recorder::new();
    let mgr = FailoverManager::builder(vec![http("only", 1)], test_config())
        .with_poller(poller.clone())
        .with_subscribers(vec![recorder.clone()])
        .build();
    mgr.start();

    // Activation succeeds (bookkeeping only), then the first poll fails and
    // no idle channel remains.
    settle(150).await;
    assert!(mgr.active_channel().await.is_none());
    assert_eq!(status_of(&mgr, "only").await, ChannelStatus::Unavailable);
    assert!(recorder.has(EventKind::Failover, None));

    // A later successful probe restores the channel to Idle but does NOT
    // reactivate it: allow_priority_restore is off.
    poller.set_reachable(&endpoint("only"));
    settle(1100).await;
    assert_eq!(status_of(&mgr, "only").await, ChannelStatus::Idle);
    assert!(recorder.has(EventKind::Restored, Some("only")));
    assert!(mgr.active_channel().await.is_none());

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn priority_restore_preempts_lower_priority_active() {
    let poller = FakePoller::new();
    poller.set_ok(&endpoint("primary"), json!(1));
    poller.set_ok(&endpoint("backup"), json!(2));

    let mut cfg = test_config();
    cfg.allow_priority_restore = true;

    let recorder = Recorder::new();
    let mgr = FailoverManager::builder(vec![http("primary", 1), http("backup", 2)], cfg)
        .with_poller(poller.clone())
        .with_subscribers(vec![recorder.clone()])
        .build();
    mgr.start();
    settle(5).await;
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "primary");

    // Primary goes down; its next poll tick demotes it.
    poller.set_down(&endpoint("primary"));
    settle(150).await;
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "backup");
    assert_eq!(status_of(&mgr, "primary").await, ChannelStatus::Unavailable);
    assert!(recorder.has(EventKind::Failover, Some("backup")));

    // Primary recovers; the next health tick restores and preempts.
    poller.set_ok(&endpoint("primary"), json!(1));
    settle(1100).await;
    assert!(recorder.has(EventKind::Restored, Some("primary")));
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "primary");
    assert_eq!(status_of(&mgr, "backup").await, ChannelStatus::Idle);
    assert_eq!(connected_count(&mgr).await, 1);

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restored_channel_fills_empty_active_slot_when_enabled() {
    let poller = FakePoller::new();

    let mut cfg = test_config();
    cfg.allow_priority_restore = true;

    let mgr = FailoverManager::builder(vec![http("only", 1)], cfg)
        .with_poller(poller.clone())
        .build();
    mgr.start();

    settle(150).await;
    assert!(mgr.active_channel().await.is_none());

    poller.set_ok(&endpoint("only"), json!("back"));
    settle(1100).await;
    let active = mgr.active_channel().await.expect("reactivated");
    assert_eq!(&*active.spec.id, "only");

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stream_payloads_keep_fifo_order_and_failure_triggers_failover() {
    let poller = FakePoller::new();
    poller.set_ok(&endpoint("backup"), json!("http"));
    let streamer = FakeStreamer::new();

    let recorder = Recorder::new();
    let mgr = FailoverManager::builder(
        vec![streaming("feed", 1), http("backup", 2)],
        test_config(),
    )
    .with_poller(poller)
    .with_streamer(streamer.clone())
    .with_subscribers(vec![recorder.clone()])
    .build();
    mgr.start();
    settle(5).await;

    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "feed");
    assert_eq!(streamer.opened(), 1);

    // Inbound messages land in the buffer in arrival order.
    let sink = streamer.sink();
    (sink.on_payload)(json!("a"));
    (sink.on_payload)(json!("b"));
    (sink.on_payload)(json!("c"));
    assert_eq!(mgr.drain_buffer(), vec![json!("a"), json!("b"), json!("c")]);

    // Socket failure feeds the same failover path as a poll failure.
    (sink.on_failure)();
    settle(5).await;
    assert_eq!(status_of(&mgr, "feed").await, ChannelStatus::Unavailable);
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "backup");
    assert!(recorder.has(EventKind::Failover, Some("backup")));

    // Exactly one connection handle was opened and closed, no double-close.
    assert_eq!(streamer.opened(), 1);
    settle(5).await;
    assert_eq!(streamer.closed(), 1);

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failure_injection_exercises_failover_until_sentinel() {
    let poller = FakePoller::new();
    poller.set_ok(&endpoint("primary"), json!(1));
    poller.set_ok(&endpoint("backup"), json!(2));

    let mut cfg = test_config();
    cfg.failure_injection = Some(Duration::from_millis(500));
    cfg.health_check_interval = Duration::from_secs(60);

    let recorder = Recorder::new();
    let mgr = FailoverManager::builder(vec![http("primary", 1), http("backup", 2)], cfg)
        .with_poller(poller)
        .with_subscribers(vec![recorder.clone()])
        .build();
    mgr.start();
    settle(5).await;
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "primary");

    // First injection: primary forcibly fails, backup takes over.
    settle(520).await;
    assert_eq!(status_of(&mgr, "primary").await, ChannelStatus::Unavailable);
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "backup");
    assert!(recorder.has(EventKind::Failover, Some("primary")));

    // Second injection: nothing idle remains, sentinel failover.
    settle(520).await;
    assert!(mgr.active_channel().await.is_none());
    assert_eq!(status_of(&mgr, "backup").await, ChannelStatus::Unavailable);
    assert!(recorder.has(EventKind::Failover, None));
    assert_eq!(connected_count(&mgr).await, 0);

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn unsubscribed_handler_stops_receiving() {
    let poller = FakePoller::new();
    poller.set_ok(&endpoint("primary"), json!(1));

    let mgr = FailoverManager::builder(vec![http("primary", 1)], test_config())
        .with_poller(poller.clone())
        .build();

    let kept = Recorder::new();
    let removed = Recorder::new();
    mgr.on_event(kept.clone());
    let id = mgr.on_event(removed.clone());

    mgr.start();
    settle(5).await;
    let seen_before = removed.count();
    assert!(seen_before > 0);
    assert!(mgr.unsubscribe(id));
    assert!(!mgr.unsubscribe(id));

    // Poll failure after detach: only the kept recorder observes it.
    poller.set_down(&endpoint("primary"));
    settle(150).await;
    assert_eq!(removed.count(), seen_before);
    assert!(kept.has(EventKind::Failover, None));

    mgr.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_closes_stream_and_silences_events() {
    let streamer = FakeStreamer::new();
    let recorder = Recorder::new();

    let mut cfg = test_config();
    cfg.failure_injection = Some(Duration::from_millis(500));

    let mgr = FailoverManager::builder(vec![streaming("feed", 1)], cfg)
        .with_streamer(streamer.clone())
        .with_subscribers(vec![recorder.clone()])
        .build();
    mgr.start();
    settle(5).await;
    assert_eq!(streamer.opened(), 1);

    mgr.stop().await;
    settle(5).await;
    assert_eq!(streamer.closed(), 1);

    // No loop ticks or events after stop.
    let seen = recorder.count();
    settle(2000).await;
    assert_eq!(recorder.count(), seen);
    assert!(mgr.active_channel().await.is_none());

    // stop() is idempotent.
    mgr.stop().await;
    assert_eq!(streamer.closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn at_most_one_connected_across_transitions() {
    let poller = FakePoller::new();
    poller.set_ok(&endpoint("a"), json!(1));
    poller.set_ok(&endpoint("b"), json!(2));
    poller.set_ok(&endpoint("c"), json!(3));

    let mut cfg = test_config();
    cfg.allow_priority_restore = true;

    let mgr = FailoverManager::builder(vec![http("a", 1), http("b", 2), http("c", 3)], cfg)
        .with_poller(poller.clone())
        .build();
    mgr.start();

    settle(5).await;
    assert_eq!(connected_count(&mgr).await, 1);

    poller.set_down(&endpoint("a"));
    settle(150).await;
    assert_eq!(connected_count(&mgr).await, 1);

    poller.set_down(&endpoint("b"));
    settle(150).await;
    assert_eq!(connected_count(&mgr).await, 1);
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "c");

    poller.set_ok(&endpoint("a"), json!(1));
    settle(1100).await;
    assert_eq!(connected_count(&mgr).await, 1);
    assert_eq!(&*mgr.active_channel().await.unwrap().spec.id, "a");

    mgr.stop().await;
}
