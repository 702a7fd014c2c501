//! # Payload buffer.
//!
//! Unbounded FIFO of opaque payload items produced by the active channel,
//! drained by pull. The drain is a consuming read: everything currently
//! buffered is returned and the buffer is reset, as one atomic step relative
//! to concurrent appends — no item is both returned and left behind, and no
//! item is lost between an append and a drain.
//!
//! Multiple concurrent drains are safe but split the contents
//! non-deterministically between callers.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::transports::Payload;

/// FIFO holding area for payloads produced by the active channel.
#[derive(Default)]
pub struct Buffer {
    items: Mutex<VecDeque<Payload>>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one payload at the tail.
    pub fn push(&self, payload: Payload) {
        self.items
            .lock()
            .expect("buffer lock poisoned")
            .push_back(payload);
    }

    /// Atomically returns and clears all buffered items, in arrival order.
    pub fn drain(&self) -> Vec<Payload> {
        let mut items = self.items.lock().expect("buffer lock poisoned");
        std::mem::take(&mut *items).into()
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("buffer lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
