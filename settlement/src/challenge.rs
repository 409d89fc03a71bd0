//! Challenge manager. Anyone may dispute a verified POI by escrowing a deposit.
//!
//! Two rules carry the whole sub-protocol:
//! - only a Verified POI can be challenged, so there is never a second
//!   concurrent challenge;
//! - a challenge is never resolved before its window closes, measured on the
//!   ledger clock.

use crate::error::SettlementError;
use crate::poi::{Challenge, Poi, PoiState};
use poi_types::{Address, Amount, ChallengeDepositPolicy, Timestamp};

/// How a challenge ended, and who receives which escrowed amounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeVerdict {
    /// The POI stands; the deposit goes to `deposit_payee` per policy.
    Dismissed {
        deposit: Amount,
        deposit_payee: Address,
    },
    /// The POI is rejected; the owner gets `refund` and the challenger its deposit back.
    Upheld {
        refund: Amount,
        owner: Address,
        deposit: Amount,
        challenger: Address,
    },
}

impl ChallengeVerdict {
    /// Total value this verdict pays out of escrow.
    pub fn payout(&self) -> Option<Amount> {
        match self {
            Self::Dismissed { deposit, .. } => Some(*deposit),
            Self::Upheld {
                refund, deposit, ..
            } => refund.checked_add(*deposit),
        }
    }
}

/// Window and deposit rules for disputes.
#[derive(Clone, Debug)]
pub struct ChallengeManager {
    duration_secs: u64,
    deposit: Amount,
    policy: ChallengeDepositPolicy,
}

impl ChallengeManager {
    pub fn new(duration_secs: u64, deposit: Amount, policy: ChallengeDepositPolicy) -> Self {
        Self {
            duration_secs,
            deposit,
            policy,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn deposit(&self) -> Amount {
        self.deposit
    }

    pub fn policy(&self) -> ChallengeDepositPolicy {
        self.policy
    }

    /// Open a challenge against `poi`, escrowing everything the challenger attached.
    pub fn open(
        &self,
        poi: &Poi,
        challenger: Address,
        attached: Amount,
        now: Timestamp,
    ) -> Result<Challenge, SettlementError> {
        if poi.state != PoiState::Verified {
            return Err(SettlementError::InvalidState {
                poi_id: poi.id,
                status: poi.status(),
            });
        }
        if attached < self.deposit {
            return Err(SettlementError::InsufficientStake {
                needed: self.deposit.raw(),
                provided: attached.raw(),
            });
        }
        Ok(Challenge {
            challenger,
            deposit: attached,
            opened_at: now,
            ends_at: now.plus_secs(self.duration_secs),
        })
    }

    /// The open challenge on `poi`, provided its window has closed at `now`.
    pub fn resolvable<'a>(
        &self,
        poi: &'a Poi,
        now: Timestamp,
    ) -> Result<&'a Challenge, SettlementError> {
        let challenge = poi.challenge().ok_or(SettlementError::InvalidState {
            poi_id: poi.id,
            status: poi.status(),
        })?;
        if now < challenge.ends_at {
            return Err(SettlementError::ChallengeWindowOpen {
                poi_id: poi.id,
                ends_at: challenge.ends_at,
            });
        }
        Ok(challenge)
    }

    /// Decide who is paid what. `accept` restores the POI (the challenge is dismissed).
    pub fn verdict(
        &self,
        poi: &Poi,
        challenge: &Challenge,
        accept: bool,
    ) -> Result<ChallengeVerdict, SettlementError> {
        if accept {
            let deposit_payee = match self.policy {
                ChallengeDepositPolicy::ReturnToChallenger => challenge.challenger,
                ChallengeDepositPolicy::ForfeitToOwner => poi.owner,
                ChallengeDepositPolicy::ForfeitToValidator => {
                    poi.validator().unwrap_or(poi.owner)
                }
            };
            return Ok(ChallengeVerdict::Dismissed {
                deposit: challenge.deposit,
                deposit_payee,
            });
        }
        let refund = poi
            .stake_amount
            .checked_sub(poi.reward_paid())
            .ok_or(SettlementError::Overflow)?;
        Ok(ChallengeVerdict::Upheld {
            refund,
            owner: poi.owner,
            deposit: challenge.deposit,
            challenger: challenge.challenger,
        })
    }
}
