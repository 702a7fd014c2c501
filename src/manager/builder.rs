//! Builder for constructing a [`FailoverManager`] with explicit dependency
//! injection: channel list, configuration, subscribers, and (mainly for
//! tests) replacement transport adapters.

use std::sync::Arc;

use crate::channels::{ChannelSpec, Registry};
use crate::config::ManagerConfig;
use crate::events::Bus;
use crate::manager::state::ManagerState;
use crate::manager::FailoverManager;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::transports::{HttpPoller, Pollable, Streaming, WsStreamer};

/// Builder returned by [`FailoverManager::builder`].
pub struct ManagerBuilder {
    channels: Vec<ChannelSpec>,
    cfg: ManagerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    poller: Option<Arc<dyn Pollable>>,
    streamer: Option<Arc<dyn Streaming>>,
}

impl ManagerBuilder {
    pub(crate) fn new(channels: Vec<ChannelSpec>, cfg: ManagerConfig) -> Self {
        Self {
            channels,
            cfg,
            subscribers: Vec::new(),
            poller: None,
            streamer: None,
        }
    }

    /// Attaches initial event subscribers. More can be added later via
    /// [`FailoverManager::on_event`].
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the HTTP adapter (default: [`HttpPoller`]).
    pub fn with_poller(mut self, poller: Arc<dyn Pollable>) -> Self {
        self.poller = Some(poller);
        self
    }

    /// Replaces the streaming adapter (default: [`WsStreamer`]).
    pub fn with_streamer(mut self, streamer: Arc<dyn Streaming>) -> Self {
        self.streamer = Some(streamer);
        self
    }

    /// Builds the manager. Nothing runs until
    /// [`start()`](FailoverManager::start) is called.
    ///
    /// Must be called from within a tokio runtime (subscriber workers are
    /// spawned here).
    pub fn build(self) -> Arc<FailoverManager> {
        let bus = Bus::new(self.cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new());
        for sub in self.subscribers {
            subs.add(sub);
        }
        let poller = self.poller.unwrap_or_else(|| Arc::new(HttpPoller::new()));
        let streamer = self.streamer.unwrap_or_else(|| Arc::new(WsStreamer::new()));
        let state = ManagerState::new(Registry::new(self.channels));

        // The manager hands a weak back-reference to its own loops and sinks.
        Arc::new_cyclic(|weak| {
            FailoverManager::new_internal(
                self.cfg,
                bus,
                subs,
                poller,
                streamer,
                state,
                weak.clone(),
            )
        })
    }
}
