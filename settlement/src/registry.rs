//! POI registry, the settlement-chain contract.
//!
//! Every operation evaluates all of its guards before touching state, commits
//! the new POI state, and only then moves value out of escrow. A failed call
//! leaves records, escrow and balances exactly as they were.

use crate::challenge::{ChallengeManager, ChallengeVerdict};
use crate::error::SettlementError;
use crate::events::SettlementEvent;
use crate::poi::{Poi, PoiState, Resolution};
use poi_binding::ChainBinding;
use poi_ledger::{AccessControl, CallContext, Ledger, Origin};
use poi_types::{Address, Amount, ChainId, PoiId, ProofDigest, ProtocolParams, Timestamp};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct PoiRegistry {
    /// Contract address; escrow is held as this account's ledger balance.
    address: Address,
    access: Arc<dyn AccessControl>,
    binding: ChainBinding,
    challenges: ChallengeManager,
    validator_reward_percentage: u8,
    pois: BTreeMap<PoiId, Poi>,
    next_id: PoiId,
    /// Pending events for the relay to process.
    pending_events: Vec<SettlementEvent>,
}

impl PoiRegistry {
    pub fn new(
        address: Address,
        params: &ProtocolParams,
        access: Arc<dyn AccessControl>,
        binding: ChainBinding,
    ) -> Self {
        Self {
            address,
            access,
            binding,
            challenges: ChallengeManager::new(
                params.challenge_duration_secs,
                params.challenge_deposit,
                params.challenge_deposit_policy,
            ),
            validator_reward_percentage: params.validator_reward_percentage,
            pois: BTreeMap::new(),
            next_id: 1,
            pending_events: Vec::new(),
        }
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Register a POI, escrowing the full value attached to the call.
    pub fn register_poi(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        name: &str,
        stake_amount: Amount,
    ) -> Result<PoiId, SettlementError> {
        if name.is_empty() {
            return Err(SettlementError::EmptyName);
        }
        // A zero stake could never pay a reward, so it counts as insufficient.
        if stake_amount.is_zero() || ctx.value < stake_amount {
            return Err(SettlementError::InsufficientStake {
                needed: stake_amount.raw(),
                provided: ctx.value.raw(),
            });
        }
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(SettlementError::Overflow)?;

        ledger.collect(ctx, self.address)?;

        let mut poi = Poi::new(
            id,
            name.to_owned(),
            ctx.caller,
            stake_amount,
            ctx.value,
            ledger.now(),
        );
        poi.state = PoiState::Verifying;
        self.pois.insert(id, poi);
        self.next_id = next_id;

        tracing::info!(
            poi_id = id,
            owner = %ctx.caller,
            stake = %stake_amount,
            escrow = %ctx.value,
            "POI registered, verification requested"
        );
        self.pending_events
            .push(SettlementEvent::VerificationRequested {
                poi_id: id,
                owner: ctx.caller,
                name: name.to_owned(),
                stake_amount,
                destination_chain: self.binding.remote_chain(),
                destination_contract: self.binding.peer(),
            });
        Ok(id)
    }

    /// Accept a validator's proof and pay the validator its share of the stake.
    ///
    /// Only the admin (directly) or the bound execution-chain contract (via
    /// the relay) may resolve. A repeated delivery for a POI that is already
    /// resolved fails with `InvalidState` and pays nothing.
    pub fn resolve_poi(
        &mut self,
        ledger: &mut Ledger,
        origin: &Origin,
        poi_id: PoiId,
        validator: Address,
        proof: Vec<u8>,
    ) -> Result<Amount, SettlementError> {
        self.authorize_resolver(origin)?;
        let poi = self.pois.get(&poi_id).ok_or(SettlementError::NotFound(poi_id))?;
        if poi.state != PoiState::Verifying {
            tracing::debug!(poi_id, status = %poi.status(), "resolution refused");
            return Err(SettlementError::InvalidState {
                poi_id,
                status: poi.status(),
            });
        }
        let reward = poi
            .stake_amount
            .percent(self.validator_reward_percentage)
            .ok_or(SettlementError::Overflow)?;
        let escrow = poi
            .escrow
            .checked_sub(reward)
            .ok_or(SettlementError::Overflow)?;
        ledger.ensure_funds(&self.address, reward)?;

        let now = ledger.now();
        let proof_digest = ProofDigest::of(&proof);
        if let Some(poi) = self.pois.get_mut(&poi_id) {
            poi.resolution = Some(Resolution {
                validator,
                proof,
                proof_digest,
                resolved_at: now,
                reward,
            });
            poi.escrow = escrow;
            poi.state = PoiState::Verified;
        }
        // Funds were checked above and no balance can exceed minted supply.
        ledger.transfer(self.address, validator, reward)?;

        tracing::info!(poi_id, %validator, %reward, proof = %proof_digest, via = %origin, "POI verified");
        self.pending_events.push(SettlementEvent::PoiResolved {
            poi_id,
            validator,
            reward,
            proof_digest,
        });
        Ok(reward)
    }

    /// Dispute a verified POI. The caller must attach at least the challenge deposit.
    pub fn challenge_poi(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        poi_id: PoiId,
    ) -> Result<Timestamp, SettlementError> {
        let poi = self.pois.get(&poi_id).ok_or(SettlementError::NotFound(poi_id))?;
        let challenge = self
            .challenges
            .open(poi, ctx.caller, ctx.value, ledger.now())?;

        ledger.collect(ctx, self.address)?;

        let ends_at = challenge.ends_at;
        let deposit = challenge.deposit;
        if let Some(poi) = self.pois.get_mut(&poi_id) {
            poi.state = PoiState::Challenged(challenge);
        }

        tracing::info!(poi_id, challenger = %ctx.caller, %deposit, %ends_at, "POI challenged");
        self.pending_events.push(SettlementEvent::PoiChallenged {
            poi_id,
            challenger: ctx.caller,
            deposit,
            ends_at,
        });
        Ok(ends_at)
    }

    /// Close a challenge once its window has passed.
    ///
    /// `accept = true` dismisses the challenge and restores Verified;
    /// `accept = false` upholds it: the POI is Rejected and the owner refunded
    /// the stake minus the reward already paid.
    pub fn resolve_poi_challenge(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        poi_id: PoiId,
        accept: bool,
    ) -> Result<ChallengeVerdict, SettlementError> {
        if !self.access.is_admin(caller) {
            return Err(SettlementError::Unauthorized(*caller));
        }
        let poi = self.pois.get(&poi_id).ok_or(SettlementError::NotFound(poi_id))?;
        let challenge = self.challenges.resolvable(poi, ledger.now())?;
        let verdict = self.challenges.verdict(poi, challenge, accept)?;
        let payout = verdict.payout().ok_or(SettlementError::Overflow)?;
        let escrow = match &verdict {
            ChallengeVerdict::Dismissed { .. } => poi.escrow,
            ChallengeVerdict::Upheld { refund, .. } => poi
                .escrow
                .checked_sub(*refund)
                .ok_or(SettlementError::Overflow)?,
        };
        ledger.ensure_funds(&self.address, payout)?;

        if let Some(poi) = self.pois.get_mut(&poi_id) {
            poi.escrow = escrow;
            poi.state = match verdict {
                ChallengeVerdict::Dismissed { .. } => PoiState::Verified,
                ChallengeVerdict::Upheld { .. } => PoiState::Rejected,
            };
        }

        match &verdict {
            ChallengeVerdict::Dismissed {
                deposit,
                deposit_payee,
            } => {
                ledger.transfer(self.address, *deposit_payee, *deposit)?;
                tracing::info!(poi_id, %deposit, payee = %deposit_payee, "challenge dismissed");
                self.pending_events
                    .push(SettlementEvent::ChallengeDismissed {
                        poi_id,
                        deposit: *deposit,
                        deposit_paid_to: *deposit_payee,
                    });
            }
            ChallengeVerdict::Upheld {
                refund,
                owner,
                deposit,
                challenger,
            } => {
                ledger.transfer(self.address, *owner, *refund)?;
                ledger.transfer(self.address, *challenger, *deposit)?;
                tracing::info!(poi_id, %owner, %refund, "challenge upheld, POI rejected");
                self.pending_events.push(SettlementEvent::PoiRejected {
                    poi_id,
                    owner: *owner,
                    refund: *refund,
                    challenger: *challenger,
                    deposit_returned: *deposit,
                });
            }
        }
        Ok(verdict)
    }

    /// Withdraw the part of a POI's escrow that its current state no longer reserves.
    pub fn claim_escrow(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        poi_id: PoiId,
    ) -> Result<Amount, SettlementError> {
        let poi = self.pois.get(&poi_id).ok_or(SettlementError::NotFound(poi_id))?;
        if poi.owner != *caller {
            return Err(SettlementError::Unauthorized(*caller));
        }
        let amount = poi.claimable();
        if amount.is_zero() {
            return Err(SettlementError::NothingToClaim(poi_id));
        }
        let escrow = poi.escrow - amount;
        ledger.ensure_funds(&self.address, amount)?;

        if let Some(poi) = self.pois.get_mut(&poi_id) {
            poi.escrow = escrow;
        }
        ledger.transfer(self.address, *caller, amount)?;

        tracing::info!(poi_id, owner = %caller, %amount, "escrow claimed");
        self.pending_events.push(SettlementEvent::EscrowClaimed {
            poi_id,
            owner: *caller,
            amount,
        });
        Ok(amount)
    }

    /// Bind the execution-chain peer contract (admin-only, once).
    pub fn update_l2_contract(
        &mut self,
        caller: &Address,
        peer: Address,
    ) -> Result<(), SettlementError> {
        self.binding.rebind(self.access.as_ref(), caller, peer)?;
        self.pending_events.push(SettlementEvent::PeerBound {
            chain: self.binding.remote_chain(),
            peer,
        });
        Ok(())
    }

    fn authorize_resolver(&self, origin: &Origin) -> Result<(), SettlementError> {
        match origin {
            Origin::Account(account) if self.access.is_admin(account) => Ok(()),
            Origin::Account(account) => Err(SettlementError::Unauthorized(*account)),
            Origin::Remote { chain, sender } => Ok(self.binding.authorize(*chain, sender)?),
        }
    }

    // ── Read views ──────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn get_poi(&self, poi_id: PoiId) -> Option<&Poi> {
        self.pois.get(&poi_id)
    }

    pub fn pois(&self) -> impl Iterator<Item = &Poi> {
        self.pois.values()
    }

    pub fn total_pois(&self) -> u64 {
        self.pois.len() as u64
    }

    pub fn challenge_duration(&self) -> u64 {
        self.challenges.duration_secs()
    }

    pub fn validator_reward_percentage(&self) -> u8 {
        self.validator_reward_percentage
    }

    pub fn challenge_deposit(&self) -> Amount {
        self.challenges.deposit()
    }

    pub fn l2_destination_contract(&self) -> Option<Address> {
        self.binding.peer()
    }

    pub fn l2_chain_id(&self) -> ChainId {
        self.binding.remote_chain()
    }

    pub fn binding(&self) -> &ChainBinding {
        &self.binding
    }

    /// Escrow the owner of `poi_id` could claim right now.
    pub fn claimable(&self, poi_id: PoiId) -> Option<Amount> {
        self.pois.get(&poi_id).map(Poi::claimable)
    }

    /// Value the registry must hold to honour every POI and open challenge.
    pub fn escrow_liabilities(&self) -> Amount {
        self.pois.values().fold(Amount::ZERO, |acc, poi| {
            let deposit = poi.challenge().map(|c| c.deposit).unwrap_or_default();
            acc.checked_add(poi.escrow)
                .and_then(|a| a.checked_add(deposit))
                .unwrap_or(acc)
        })
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> Vec<SettlementEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
