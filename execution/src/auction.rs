//! Verification auction, the execution-chain contract that assigns POIs to validators.
//!
//! ```text
//!   open (relayed request) ──► Open ──settle──► Awarded ──submit_proof──► Completed
//!                               │
//!                               └──settle, no eligible entrant──► Failed ──open──► Open
//! ```

use crate::error::ExecutionError;
use crate::events::ExecutionEvent;
use crate::selection::SelectionPolicy;
use crate::validators::{Validator, ValidatorRegistry};
use poi_binding::ChainBinding;
use poi_ledger::{AccessControl, Ledger, Origin};
use poi_types::{Address, Amount, ChainId, PoiId, ProofDigest, ProtocolParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A verification request as relayed from the settlement chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub poi_id: PoiId,
    pub name: String,
    pub owner: Address,
    pub stake_amount: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionState {
    Open,
    Awarded { winner: Address },
    Completed { winner: Address, proof_digest: ProofDigest },
    /// Settled with no eligible entrant.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionStatus {
    Open,
    Awarded,
    Completed,
    Failed,
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Awarded => "awarded",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl AuctionState {
    pub fn status(&self) -> AuctionStatus {
        match self {
            Self::Open => AuctionStatus::Open,
            Self::Awarded { .. } => AuctionStatus::Awarded,
            Self::Completed { .. } => AuctionStatus::Completed,
            Self::Failed => AuctionStatus::Failed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub request: VerificationRequest,
    pub opened_at: Timestamp,
    /// Entries are accepted strictly before this time; settlement from it on.
    pub ends_at: Timestamp,
    /// Entrants in order of entry.
    pub entrants: Vec<Address>,
    /// 1 for the first opening, incremented on each re-open after failure.
    pub attempt: u32,
    pub state: AuctionState,
}

impl Auction {
    pub fn status(&self) -> AuctionStatus {
        self.state.status()
    }

    pub fn winner(&self) -> Option<Address> {
        match self.state {
            AuctionState::Awarded { winner } | AuctionState::Completed { winner, .. } => Some(winner),
            AuctionState::Open | AuctionState::Failed => None,
        }
    }

    pub fn is_open_at(&self, now: Timestamp) -> bool {
        self.state == AuctionState::Open && now < self.ends_at
    }
}

pub struct VerificationAuction {
    address: Address,
    access: Arc<dyn AccessControl>,
    binding: ChainBinding,
    policy: Box<dyn SelectionPolicy>,
    duration_secs: u64,
    min_reputation: u64,
    min_stake: Amount,
    auctions: BTreeMap<PoiId, Auction>,
    pending_events: Vec<ExecutionEvent>,
}

impl VerificationAuction {
    pub fn new(
        address: Address,
        params: &ProtocolParams,
        access: Arc<dyn AccessControl>,
        binding: ChainBinding,
        policy: Box<dyn SelectionPolicy>,
    ) -> Self {
        Self {
            address,
            access,
            binding,
            policy,
            duration_secs: params.auction_duration_secs,
            min_reputation: params.min_validator_reputation,
            min_stake: params.min_validator_stake,
            auctions: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Open an auction for a relayed verification request.
    ///
    /// Only the bound settlement contract may open auctions. A request that
    /// is delivered twice fails with `AuctionExists` unless the earlier
    /// auction failed, in which case it is re-opened.
    pub fn open(
        &mut self,
        ledger: &Ledger,
        origin: &Origin,
        request: VerificationRequest,
    ) -> Result<Timestamp, ExecutionError> {
        self.binding.authorize_origin(origin)?;
        let poi_id = request.poi_id;
        let attempt = match self.auctions.get(&poi_id) {
            None => 1,
            Some(existing) if existing.state == AuctionState::Failed => existing
                .attempt
                .checked_add(1)
                .ok_or(ExecutionError::Overflow)?,
            Some(existing) => {
                tracing::debug!(poi_id, status = %existing.status(), "duplicate verification request");
                return Err(ExecutionError::AuctionExists {
                    poi_id,
                    status: existing.status(),
                });
            }
        };

        let now = ledger.now();
        let ends_at = now.plus_secs(self.duration_secs);
        self.auctions.insert(
            poi_id,
            Auction {
                request,
                opened_at: now,
                ends_at,
                entrants: Vec::new(),
                attempt,
                state: AuctionState::Open,
            },
        );

        tracing::info!(poi_id, %ends_at, attempt, "verification auction opened");
        self.pending_events.push(ExecutionEvent::AuctionOpened {
            poi_id,
            ends_at,
            attempt,
        });
        Ok(ends_at)
    }

    /// Enter `caller` into the open auction for `poi_id`.
    pub fn enter(
        &mut self,
        ledger: &Ledger,
        validators: &ValidatorRegistry,
        caller: &Address,
        poi_id: PoiId,
    ) -> Result<(), ExecutionError> {
        validators.check_eligible(caller, self.min_reputation)?;
        let auction = self
            .auctions
            .get_mut(&poi_id)
            .ok_or(ExecutionError::AuctionNotFound(poi_id))?;
        if !auction.is_open_at(ledger.now()) {
            return Err(ExecutionError::AuctionClosed(poi_id));
        }
        if auction.entrants.contains(caller) {
            return Err(ExecutionError::AlreadyEntered {
                poi_id,
                validator: *caller,
            });
        }
        auction.entrants.push(*caller);

        tracing::debug!(poi_id, validator = %caller, entrants = auction.entrants.len(), "auction entry");
        self.pending_events.push(ExecutionEvent::AuctionEntered {
            poi_id,
            validator: *caller,
        });
        Ok(())
    }

    /// Close the auction for `poi_id` and pick a winner. Anyone may call this
    /// once the window has ended.
    ///
    /// Returns the winner, or `None` if the auction failed for lack of
    /// eligible entrants.
    pub fn settle(
        &mut self,
        ledger: &Ledger,
        validators: &ValidatorRegistry,
        poi_id: PoiId,
    ) -> Result<Option<Address>, ExecutionError> {
        let min_reputation = self.min_reputation;
        let auction = self
            .auctions
            .get_mut(&poi_id)
            .ok_or(ExecutionError::AuctionNotFound(poi_id))?;
        if auction.state != AuctionState::Open {
            return Err(ExecutionError::InvalidState {
                poi_id,
                status: auction.status(),
            });
        }
        if ledger.now() < auction.ends_at {
            return Err(ExecutionError::AuctionWindowOpen {
                poi_id,
                ends_at: auction.ends_at,
            });
        }

        let candidates: Vec<&Validator> = auction
            .entrants
            .iter()
            .filter_map(|addr| validators.check_eligible(addr, min_reputation).ok())
            .collect();
        let winner = self.policy.select(poi_id, &candidates).map(|v| v.address);

        match winner {
            Some(winner) => {
                auction.state = AuctionState::Awarded { winner };
                tracing::info!(
                    poi_id,
                    %winner,
                    entrants = auction.entrants.len(),
                    policy = self.policy.name(),
                    "auction awarded"
                );
                self.pending_events
                    .push(ExecutionEvent::AuctionAwarded { poi_id, winner });
            }
            None => {
                auction.state = AuctionState::Failed;
                tracing::warn!(poi_id, attempt = auction.attempt, "auction failed, no eligible entrant");
                self.pending_events.push(ExecutionEvent::AuctionFailed {
                    poi_id,
                    attempt: auction.attempt,
                });
            }
        }
        Ok(winner)
    }

    /// Deliver the winner's verification proof. The resulting
    /// `ResolutionReady` event is relayed to the settlement chain.
    pub fn submit_proof(
        &mut self,
        validators: &mut ValidatorRegistry,
        caller: &Address,
        poi_id: PoiId,
        proof: Vec<u8>,
    ) -> Result<ProofDigest, ExecutionError> {
        let auction = self
            .auctions
            .get_mut(&poi_id)
            .ok_or(ExecutionError::AuctionNotFound(poi_id))?;
        let winner = match auction.state {
            AuctionState::Awarded { winner } => winner,
            _ => {
                return Err(ExecutionError::InvalidState {
                    poi_id,
                    status: auction.status(),
                })
            }
        };
        if *caller != winner {
            return Err(ExecutionError::NotWinner {
                poi_id,
                caller: *caller,
            });
        }
        validators.record_verified(&winner)?;

        let proof_digest = ProofDigest::of(&proof);
        auction.state = AuctionState::Completed {
            winner,
            proof_digest,
        };

        tracing::info!(poi_id, %winner, proof = %proof_digest, "verification proof submitted");
        self.pending_events.push(ExecutionEvent::ResolutionReady {
            poi_id,
            winner,
            proof,
            destination_chain: self.binding.remote_chain(),
            destination_contract: self.binding.peer(),
        });
        Ok(proof_digest)
    }

    /// Bind the settlement-chain origin contract. Admin-only, once.
    pub fn update_l1_contract(&mut self, caller: &Address, peer: Address) -> Result<(), ExecutionError> {
        self.binding.rebind(self.access.as_ref(), caller, peer)?;
        Ok(())
    }

    // ── Views ───────────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn auction(&self, poi_id: PoiId) -> Option<&Auction> {
        self.auctions.get(&poi_id)
    }

    pub fn auctions(&self) -> impl Iterator<Item = &Auction> {
        self.auctions.values()
    }

    /// Open auctions whose entry window has closed at `now`.
    pub fn due(&self, now: Timestamp) -> Vec<PoiId> {
        self.auctions
            .iter()
            .filter(|(_, a)| a.state == AuctionState::Open && now >= a.ends_at)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn auction_duration(&self) -> u64 {
        self.duration_secs
    }

    pub fn min_validator_reputation(&self) -> u64 {
        self.min_reputation
    }

    pub fn min_validator_stake(&self) -> Amount {
        self.min_stake
    }

    pub fn l1_origin_contract(&self) -> Option<Address> {
        self.binding.peer()
    }

    pub fn l1_chain_id(&self) -> ChainId {
        self.binding.remote_chain()
    }

    pub fn binding(&self) -> &ChainBinding {
        &self.binding
    }

    pub fn selection_policy(&self) -> &str {
        self.policy.name()
    }

    pub fn drain_events(&mut self) -> Vec<ExecutionEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
