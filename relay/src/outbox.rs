//! Outbound envelope queue for one source contract.

use crate::envelope::{Envelope, Message, PROTOCOL_VERSION};
use crate::error::RelayError;
use poi_types::{Address, ChainId};
use std::collections::VecDeque;

/// Wraps messages from one contract into envelopes with increasing nonces.
#[derive(Debug)]
pub struct Outbox {
    source_chain: ChainId,
    source_contract: Address,
    destination_chain: ChainId,
    next_nonce: u64,
    queue: VecDeque<Envelope>,
}

impl Outbox {
    pub fn new(source_chain: ChainId, source_contract: Address, destination_chain: ChainId) -> Self {
        Self {
            source_chain,
            source_contract,
            destination_chain,
            next_nonce: 0,
            queue: VecDeque::new(),
        }
    }

    /// Queue `message` and return the nonce it was assigned.
    pub fn push(&mut self, message: Message) -> Result<u64, RelayError> {
        let nonce = self.next_nonce;
        self.next_nonce = nonce.checked_add(1).ok_or(RelayError::NonceOverflow)?;
        tracing::trace!(
            chain = %self.source_chain,
            nonce,
            kind = message.kind(),
            poi_id = message.poi_id(),
            "queued envelope"
        );
        self.queue.push_back(Envelope {
            version: PROTOCOL_VERSION,
            source_chain: self.source_chain,
            source_contract: self.source_contract,
            destination_chain: self.destination_chain,
            nonce,
            message,
        });
        Ok(nonce)
    }

    /// Take every queued envelope, oldest first.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }
}
