//! POI records and their lifecycle state.

use poi_types::{Address, Amount, PoiId, ProofDigest, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An open dispute against a verified POI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenger: Address,
    /// Full value attached by the challenger, held in escrow until resolution.
    pub deposit: Amount,
    pub opened_at: Timestamp,
    /// The challenge cannot be resolved before this ledger time.
    pub ends_at: Timestamp,
}

/// Lifecycle state of a POI.
///
/// This enum is the single source of truth: `verified`, `challenged` and the
/// challenge end time are all derived from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoiState {
    /// Created but escrow not yet collected. Never observable after a successful registration.
    Pending,
    /// Waiting for a validator's proof from the execution chain.
    Verifying,
    /// Proof accepted and validator paid.
    Verified,
    /// Under dispute.
    Challenged(Challenge),
    /// Challenge upheld. Terminal.
    Rejected,
}

/// Fieldless view of [`PoiState`] for errors, logs and read views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoiStatus {
    Pending,
    Verifying,
    Verified,
    Challenged,
    Rejected,
}

impl fmt::Display for PoiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Challenged => "challenged",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl PoiState {
    pub fn status(&self) -> PoiStatus {
        match self {
            Self::Pending => PoiStatus::Pending,
            Self::Verifying => PoiStatus::Verifying,
            Self::Verified => PoiStatus::Verified,
            Self::Challenged(_) => PoiStatus::Challenged,
            Self::Rejected => PoiStatus::Rejected,
        }
    }
}

/// What the validator delivered when the POI was resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub validator: Address,
    pub proof: Vec<u8>,
    pub proof_digest: ProofDigest,
    pub resolved_at: Timestamp,
    /// Reward paid to the validator out of escrow. Never clawed back.
    pub reward: Amount,
}

/// A registered point of interest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    pub owner: Address,
    /// Stake declared at registration. Immutable.
    pub stake_amount: Amount,
    /// Value still held in escrow for this POI (starts at the full attached value).
    pub escrow: Amount,
    pub registered_at: Timestamp,
    pub resolution: Option<Resolution>,
    pub state: PoiState,
}

impl Poi {
    pub(crate) fn new(
        id: PoiId,
        name: String,
        owner: Address,
        stake_amount: Amount,
        escrow: Amount,
        registered_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            stake_amount,
            escrow,
            registered_at,
            resolution: None,
            state: PoiState::Pending,
        }
    }

    pub fn status(&self) -> PoiStatus {
        self.state.status()
    }

    /// True only while Verified or Challenged.
    pub fn verified(&self) -> bool {
        matches!(self.state, PoiState::Verified | PoiState::Challenged(_))
    }

    /// True only while Challenged.
    pub fn challenged(&self) -> bool {
        matches!(self.state, PoiState::Challenged(_))
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        match &self.state {
            PoiState::Challenged(c) => Some(c),
            _ => None,
        }
    }

    /// Set if and only if the POI is Challenged.
    pub fn challenge_end_time(&self) -> Option<Timestamp> {
        self.challenge().map(|c| c.ends_at)
    }

    pub fn validator(&self) -> Option<Address> {
        self.resolution.as_ref().map(|r| r.validator)
    }

    pub fn proof(&self) -> Option<&[u8]> {
        self.resolution.as_ref().map(|r| r.proof.as_slice())
    }

    /// Ledger time of resolution.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.resolution.as_ref().map(|r| r.resolved_at)
    }

    /// Validator reward already paid, zero before resolution.
    pub fn reward_paid(&self) -> Amount {
        self.resolution
            .as_ref()
            .map(|r| r.reward)
            .unwrap_or_default()
    }

    /// Escrow the current state still owes someone.
    ///
    /// Before resolution the whole stake is owed (reward + possible refund);
    /// once resolved, only the refund a future rejection would pay.
    pub fn reserved(&self) -> Amount {
        match self.state {
            PoiState::Pending | PoiState::Verifying => self.stake_amount,
            PoiState::Verified | PoiState::Challenged(_) => {
                self.stake_amount.saturating_sub(self.reward_paid())
            }
            PoiState::Rejected => Amount::ZERO,
        }
    }

    /// Escrow the owner may withdraw right now.
    pub fn claimable(&self) -> Amount {
        self.escrow.saturating_sub(self.reserved())
    }
}
