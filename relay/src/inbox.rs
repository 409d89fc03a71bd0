//! Redelivery detection for inbound envelopes.
//!
//! Keeps a bounded, insertion-ordered set of `(source chain, nonce)` pairs.
//! Oldest entries are evicted once capacity is reached.

use crate::envelope::Envelope;
use poi_types::ChainId;
use std::collections::{HashSet, VecDeque};

/// Default capacity: remember the last 65 536 deliveries.
pub const DEFAULT_INBOX_CAPACITY: usize = 65_536;

/// Outcome of offering an envelope to the inbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// First sighting; forward it to the destination contract.
    Fresh,
    /// Already delivered; drop it.
    Duplicate,
}

pub struct Inbox {
    capacity: usize,
    seen: HashSet<(ChainId, u64)>,
    order: VecDeque<(ChainId, u64)>,
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Record `envelope` and report whether it was seen before.
    pub fn accept(&mut self, envelope: &Envelope) -> Delivery {
        let key = (envelope.source_chain, envelope.nonce);
        if self.seen.contains(&key) {
            tracing::debug!(chain = %key.0, nonce = key.1, "duplicate envelope");
            return Delivery::Duplicate;
        }
        if self.seen.len() >= self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
        self.seen.insert(key);
        self.order.push_back(key);
        Delivery::Fresh
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new(DEFAULT_INBOX_CAPACITY)
    }
}
