//! Bounded FIFO buffer of raw feed messages.
//!
//! The feed task is the only writer; any number of query handlers may read
//! concurrently. Readers get an independent copy, so they never observe a
//! partially appended or partially evicted sequence.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::VecDeque;

/// Default number of raw messages retained.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Capacity-bounded, insertion-ordered buffer of raw feed messages.
///
/// When full, appending evicts from the front (strict FIFO, not LRU): this is
/// an ingestion-order window, not an access-order cache.
pub struct MessageStore {
    capacity: usize,
    messages: RwLock<VecDeque<Value>>,
}

impl MessageStore {
    /// Create an empty store with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a raw message, evicting the oldest entries while over capacity.
    pub fn append(&self, msg: Value) {
        let mut messages = self.messages.write();
        messages.push_back(msg);
        while messages.len() > self.capacity {
            messages.pop_front();
        }
    }

    /// Copy of the current contents in insertion order.
    pub fn snapshot(&self) -> Vec<Value> {
        self.messages.read().iter().cloned().collect()
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
