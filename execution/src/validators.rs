//! Validator registry: staking, reputation and verification counters.

use crate::error::ExecutionError;
use crate::events::ExecutionEvent;
use crate::reputation::ReputationAssessor;
use poi_ledger::{CallContext, Ledger};
use poi_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered validator. Records exist only for registered validators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub staked_amount: Amount,
    pub reputation: u64,
    /// Proofs this validator has submitted for auctions it won. Counted on
    /// the execution chain when the proof is handed to the relay, so it does
    /// not track whether the settlement chain later accepted the resolution.
    pub total_verified: u64,
    pub registered_at: Timestamp,
    /// Registration order, used as the final tie-break in selection.
    pub sequence: u64,
}

impl Validator {
    pub fn is_registered(&self) -> bool {
        true
    }
}

pub struct ValidatorRegistry {
    /// Contract address; stakes are held as this account's ledger balance.
    address: Address,
    assessor: Box<dyn ReputationAssessor>,
    min_stake: Amount,
    validators: HashMap<Address, Validator>,
    next_sequence: u64,
    pending_events: Vec<ExecutionEvent>,
}

impl ValidatorRegistry {
    pub fn new(address: Address, min_stake: Amount, assessor: Box<dyn ReputationAssessor>) -> Self {
        Self {
            address,
            assessor,
            min_stake,
            validators: HashMap::new(),
            next_sequence: 0,
            pending_events: Vec::new(),
        }
    }

    /// Register the caller as a validator, escrowing the full attached value as stake.
    pub fn register_validator(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        reputation_proof: &[u8],
    ) -> Result<&Validator, ExecutionError> {
        if self.validators.contains_key(&ctx.caller) {
            return Err(ExecutionError::AlreadyRegistered(ctx.caller));
        }
        if ctx.value < self.min_stake {
            return Err(ExecutionError::InsufficientStake {
                needed: self.min_stake.raw(),
                provided: ctx.value.raw(),
            });
        }
        let sequence = self.next_sequence;
        let next_sequence = sequence.checked_add(1).ok_or(ExecutionError::Overflow)?;

        ledger.collect(ctx, self.address)?;

        let reputation = self.assessor.assess(&ctx.caller, reputation_proof);
        let validator = Validator {
            address: ctx.caller,
            staked_amount: ctx.value,
            reputation,
            total_verified: 0,
            registered_at: ledger.now(),
            sequence,
        };
        self.next_sequence = next_sequence;

        tracing::info!(
            validator = %ctx.caller,
            stake = %ctx.value,
            reputation,
            assessor = self.assessor.name(),
            "validator registered"
        );
        self.pending_events.push(ExecutionEvent::ValidatorRegistered {
            validator: ctx.caller,
            stake: ctx.value,
            reputation,
        });
        Ok(self.validators.entry(ctx.caller).or_insert(validator))
    }

    /// Count one submitted proof for `validator`.
    ///
    /// Called by the auction when the winner submits; there is no reverse
    /// channel from the settlement chain, so a resolution it refuses is not
    /// taken back out of the count.
    pub fn record_verified(&mut self, validator: &Address) -> Result<u64, ExecutionError> {
        let record = self
            .validators
            .get_mut(validator)
            .ok_or(ExecutionError::NotRegistered(*validator))?;
        record.total_verified = record
            .total_verified
            .checked_add(1)
            .ok_or(ExecutionError::Overflow)?;
        Ok(record.total_verified)
    }

    /// The registered validator at `address`, if its reputation reaches `min_reputation`.
    pub fn check_eligible(
        &self,
        address: &Address,
        min_reputation: u64,
    ) -> Result<&Validator, ExecutionError> {
        let validator = self
            .validators
            .get(address)
            .ok_or(ExecutionError::NotRegistered(*address))?;
        if validator.reputation < min_reputation {
            return Err(ExecutionError::Ineligible {
                validator: *address,
                reputation: validator.reputation,
                required: min_reputation,
            });
        }
        Ok(validator)
    }

    // ── Views ───────────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn validator(&self, address: &Address) -> Option<&Validator> {
        self.validators.get(address)
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.validators.contains_key(address)
    }

    pub fn total_validators(&self) -> u64 {
        self.validators.len() as u64
    }

    pub fn min_validator_stake(&self) -> Amount {
        self.min_stake
    }

    /// Validators whose reputation reaches `min_reputation`, in registration order.
    pub fn eligible(&self, min_reputation: u64) -> Vec<&Validator> {
        let mut list: Vec<&Validator> = self
            .validators
            .values()
            .filter(|v| v.reputation >= min_reputation)
            .collect();
        list.sort_by_key(|v| v.sequence);
        list
    }

    /// Sum of all stakes held by the registry.
    pub fn total_staked(&self) -> Amount {
        self.validators
            .values()
            .fold(Amount::ZERO, |acc, v| acc.checked_add(v.staked_amount).unwrap_or(acc))
    }

    pub fn drain_events(&mut self) -> Vec<ExecutionEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
