//! An in-process two-chain deployment and the relay between its chains.
//!
//! ```text
//!   settlement ledger                               execution ledger
//!   ┌──────────────┐  VerificationRequest  ┌──────────────────────────┐
//!   │ PoiRegistry  │ ────── envelope ────► │ VerificationAuction      │
//!   │              │ ◄───── envelope ───── │ ValidatorRegistry        │
//!   └──────────────┘      Resolution       └──────────────────────────┘
//! ```
//!
//! Every envelope is encoded to bytes and decoded again on delivery, so the
//! in-process relay exercises the same wire format an external one would.

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::RelayMetrics;
use poi_binding::ChainBinding;
use poi_execution::{
    AuctionStatus, ExecutionEvent, PresenceAssessor, ValidatorRegistry, VerificationAuction,
    VerificationRequest,
};
use poi_ledger::{Clock, Ledger, Origin, OwnerAccess};
use poi_relay::{Delivery, Envelope, Inbox, Message, Outbox};
use poi_settlement::{PoiRegistry, SettlementEvent};
use poi_types::{Address, Amount, ChainId, PoiId};
use std::sync::Arc;

pub struct SettlementChain {
    pub ledger: Ledger,
    pub registry: PoiRegistry,
}

pub struct ExecutionChain {
    pub ledger: Ledger,
    pub validators: ValidatorRegistry,
    pub auction: VerificationAuction,
}

/// What happened to one envelope offered to [`Deployment::deliver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Applied,
    Duplicate,
    /// The destination contract refused the message; the reason is its error.
    Rejected(String),
}

/// Counts from one [`Deployment::pump`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub sent: usize,
    pub applied: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

impl PumpReport {
    pub fn is_idle(&self) -> bool {
        self.sent == 0
    }
}

pub struct Deployment {
    pub settlement: SettlementChain,
    pub execution: ExecutionChain,
    admin: Address,
    settlement_outbox: Outbox,
    execution_outbox: Outbox,
    settlement_inbox: Inbox,
    execution_inbox: Inbox,
    metrics: RelayMetrics,
}

impl Deployment {
    /// Deploy both sides and bind them to each other.
    ///
    /// 1. The registry is deployed unbound (its peer does not exist yet).
    /// 2. The auction is deployed bound to the registry.
    /// 3. The registry is bound to the auction.
    pub fn bootstrap(config: &NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        config.validate()?;
        let params = &config.params;
        let access = Arc::new(OwnerAccess::new(config.admin));
        let (l1, l2) = (config.settlement_chain_id, config.execution_chain_id);

        let mut registry = PoiRegistry::new(
            config.registry_address,
            params,
            access.clone(),
            ChainBinding::unbound(l1, l2),
        );
        let validators = ValidatorRegistry::new(
            config.validators_address,
            params.min_validator_stake,
            Box::new(PresenceAssessor::from_params(params)),
        );
        let auction = VerificationAuction::new(
            config.auction_address,
            params,
            access,
            ChainBinding::new(l2, l1, config.registry_address),
            config.selection.build()?,
        );
        registry.update_l2_contract(&config.admin, config.auction_address)?;

        let metrics = RelayMetrics::new()?;
        tracing::info!(
            settlement = %l1,
            execution = %l2,
            registry = %config.registry_address,
            auction = %config.auction_address,
            selection = auction.selection_policy(),
            "deployment bootstrapped"
        );

        Ok(Self {
            settlement: SettlementChain {
                ledger: Ledger::new(l1, clock.clone()),
                registry,
            },
            execution: ExecutionChain {
                ledger: Ledger::new(l2, clock),
                validators,
                auction,
            },
            admin: config.admin,
            settlement_outbox: Outbox::new(l1, config.registry_address, l2),
            execution_outbox: Outbox::new(l2, config.auction_address, l1),
            settlement_inbox: Inbox::new(config.inbox_capacity),
            execution_inbox: Inbox::new(config.inbox_capacity),
            metrics,
        })
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Credit `amount` to `account` on `chain` (dev faucet).
    pub fn fund(&mut self, chain: ChainId, account: Address, amount: Amount) -> Result<(), NodeError> {
        self.ledger_mut(chain)?.mint(account, amount)?;
        Ok(())
    }

    pub fn ledger(&self, chain: ChainId) -> Result<&Ledger, NodeError> {
        if chain == self.settlement.ledger.chain_id() {
            Ok(&self.settlement.ledger)
        } else if chain == self.execution.ledger.chain_id() {
            Ok(&self.execution.ledger)
        } else {
            Err(NodeError::Misrouted(chain))
        }
    }

    fn ledger_mut(&mut self, chain: ChainId) -> Result<&mut Ledger, NodeError> {
        if chain == self.settlement.ledger.chain_id() {
            Ok(&mut self.settlement.ledger)
        } else if chain == self.execution.ledger.chain_id() {
            Ok(&mut self.execution.ledger)
        } else {
            Err(NodeError::Misrouted(chain))
        }
    }

    /// Turn pending contract events into encoded envelopes, without delivering them.
    pub fn flush(&mut self) -> Result<Vec<Vec<u8>>, NodeError> {
        for event in self.settlement.registry.drain_events() {
            match event {
                SettlementEvent::VerificationRequested {
                    poi_id,
                    owner,
                    name,
                    stake_amount,
                    destination_contract,
                    ..
                } => {
                    if destination_contract.is_none() {
                        tracing::warn!(poi_id, "registry is unbound, verification request not relayed");
                        continue;
                    }
                    self.settlement_outbox.push(Message::VerificationRequest {
                        poi_id,
                        name,
                        owner,
                        stake_amount,
                    })?;
                }
                other => tracing::debug!(event = ?other, "settlement event"),
            }
        }
        for event in self.execution.validators.drain_events() {
            tracing::debug!(event = ?event, "validator event");
        }
        let mut retries = Vec::new();
        for event in self.execution.auction.drain_events() {
            match event {
                ExecutionEvent::ResolutionReady {
                    poi_id,
                    winner,
                    proof,
                    ..
                } => {
                    self.execution_outbox.push(Message::Resolution {
                        poi_id,
                        validator: winner,
                        proof,
                    })?;
                }
                ExecutionEvent::AuctionAwarded { .. } => self.metrics.auctions_awarded.inc(),
                ExecutionEvent::AuctionFailed { poi_id, attempt } => {
                    self.metrics.auctions_failed.inc();
                    if let Some(auction) = self.execution.auction.auction(poi_id) {
                        tracing::info!(poi_id, attempt, "auction failed, re-requesting verification");
                        retries.push(auction.request.clone());
                    }
                }
                other => tracing::debug!(event = ?other, "auction event"),
            }
        }
        // The POI is still pending on the settlement side, so its request is
        // sent again under a fresh nonce and the auction re-opens.
        for request in retries {
            self.settlement_outbox.push(Message::VerificationRequest {
                poi_id: request.poi_id,
                name: request.name,
                owner: request.owner,
                stake_amount: request.stake_amount,
            })?;
        }

        let mut frames = Vec::new();
        for envelope in self
            .settlement_outbox
            .drain()
            .into_iter()
            .chain(self.execution_outbox.drain())
        {
            frames.push(envelope.encode()?);
        }
        self.metrics.envelopes_sent.inc_by(frames.len() as u64);
        Ok(frames)
    }

    /// Decode one frame and apply it to its destination contract.
    ///
    /// A contract refusing the message is an outcome, not an error, and so is
    /// a message kind its destination chain does not accept. Errors are
    /// reserved for frames that cannot be decoded or name an unknown chain.
    pub fn deliver(&mut self, frame: &[u8]) -> Result<DeliveryOutcome, NodeError> {
        let envelope = Envelope::decode(frame)?;
        let origin = Origin::Remote {
            chain: envelope.source_chain,
            sender: envelope.source_contract,
        };
        let inbox = if envelope.destination_chain == self.settlement.ledger.chain_id() {
            &mut self.settlement_inbox
        } else if envelope.destination_chain == self.execution.ledger.chain_id() {
            &mut self.execution_inbox
        } else {
            return Err(NodeError::Misrouted(envelope.destination_chain));
        };
        if inbox.accept(&envelope) == Delivery::Duplicate {
            self.metrics.envelopes_duplicate.inc();
            return Ok(DeliveryOutcome::Duplicate);
        }

        let poi_id = envelope.message.poi_id();
        let kind = envelope.message.kind();
        let result = self.apply(envelope.destination_chain, &origin, envelope.message);
        match result {
            Ok(()) => {
                self.metrics.envelopes_delivered.inc();
                tracing::debug!(poi_id, kind, nonce = envelope.nonce, "envelope applied");
                Ok(DeliveryOutcome::Applied)
            }
            Err(err @ (NodeError::Settlement(_) | NodeError::Execution(_) | NodeError::Misrouted(_))) => {
                self.metrics.deliveries_rejected.inc();
                tracing::warn!(poi_id, kind, %origin, error = %err, "delivery rejected");
                Ok(DeliveryOutcome::Rejected(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    fn apply(&mut self, destination: ChainId, origin: &Origin, message: Message) -> Result<(), NodeError> {
        match message {
            Message::VerificationRequest {
                poi_id,
                name,
                owner,
                stake_amount,
            } => {
                if destination != self.execution.ledger.chain_id() {
                    return Err(NodeError::Misrouted(destination));
                }
                self.execution.auction.open(
                    &self.execution.ledger,
                    origin,
                    VerificationRequest {
                        poi_id,
                        name,
                        owner,
                        stake_amount,
                    },
                )?;
            }
            Message::Resolution {
                poi_id,
                validator,
                proof,
            } => {
                if destination != self.settlement.ledger.chain_id() {
                    return Err(NodeError::Misrouted(destination));
                }
                self.settlement.registry.resolve_poi(
                    &mut self.settlement.ledger,
                    origin,
                    poi_id,
                    validator,
                    proof,
                )?;
            }
        }
        Ok(())
    }

    /// Flush pending events and deliver every resulting envelope.
    pub fn pump(&mut self) -> Result<PumpReport, NodeError> {
        let frames = self.flush()?;
        let mut report = PumpReport {
            sent: frames.len(),
            ..PumpReport::default()
        };
        for frame in &frames {
            match self.deliver(frame)? {
                DeliveryOutcome::Applied => report.applied += 1,
                DeliveryOutcome::Duplicate => report.duplicates += 1,
                DeliveryOutcome::Rejected(_) => report.rejected += 1,
            }
        }
        self.refresh_gauges();
        Ok(report)
    }

    /// Settle every auction whose window has closed. Returns each auction's winner.
    pub fn settle_due(&mut self) -> Result<Vec<(PoiId, Option<Address>)>, NodeError> {
        let due = self.execution.auction.due(self.execution.ledger.now());
        let mut settled = Vec::with_capacity(due.len());
        for poi_id in due {
            let winner = self.execution.auction.settle(
                &self.execution.ledger,
                &self.execution.validators,
                poi_id,
            )?;
            settled.push((poi_id, winner));
        }
        self.refresh_gauges();
        Ok(settled)
    }

    fn refresh_gauges(&self) {
        let open = self
            .execution
            .auction
            .auctions()
            .filter(|a| a.status() == AuctionStatus::Open)
            .count();
        self.metrics.open_auctions.set(open as i64);
        self.metrics
            .registered_pois
            .set(self.settlement.registry.total_pois() as i64);
    }
}
