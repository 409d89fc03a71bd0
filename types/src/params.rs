//! Protocol parameters for both sides of the POI protocol.
//!
//! Every value is fixed at deployment. Defaults reproduce the observed
//! production configuration.

use crate::amount::Amount;
use crate::error::TypesError;
use serde::{Deserialize, Serialize};

/// Who keeps a challenger's deposit when the challenge is dismissed
/// (the POI is restored to Verified).
///
/// A successful challenge always returns the deposit to the challenger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeDepositPolicy {
    /// The deposit goes back to the challenger; challenges are free apart from locked capital.
    ReturnToChallenger,
    /// The deposit is paid to the POI owner.
    ForfeitToOwner,
    /// The deposit is paid to the validator whose verification was defended.
    #[default]
    ForfeitToValidator,
}

/// All protocol parameters stored by both chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    // ── Settlement chain ─────────────────────────────────────────────────
    /// Length of a challenge window in seconds. Default: 3 days.
    pub challenge_duration_secs: u64,

    /// Share of a POI's stake paid to its validator at resolution (percent, 0..=100).
    pub validator_reward_percentage: u8,

    /// Value a challenger must attach to open a challenge. Default: 0.1.
    pub challenge_deposit: Amount,

    /// Disposition of the deposit when a challenge is dismissed.
    pub challenge_deposit_policy: ChallengeDepositPolicy,

    // ── Execution chain ──────────────────────────────────────────────────
    /// Length of a verification auction window in seconds. Default: 1 day.
    pub auction_duration_secs: u64,

    /// Minimum value a validator must attach to register. Default: 0.5.
    pub min_validator_stake: Amount,

    /// Minimum reputation a validator needs to enter an auction. Default: 100.
    pub min_validator_reputation: u64,

    /// Reputation assigned to a validator registered without a reputation proof.
    pub base_reputation: u64,

    /// Reputation assigned to a validator registered with a reputation proof.
    pub boosted_reputation: u64,
}

impl ProtocolParams {
    /// Three days, in seconds.
    pub const DEFAULT_CHALLENGE_DURATION_SECS: u64 = 3 * 24 * 3600;
    /// One day, in seconds.
    pub const DEFAULT_AUCTION_DURATION_SECS: u64 = 24 * 3600;

    /// The observed production configuration.
    pub fn observed_defaults() -> Self {
        Self {
            challenge_duration_secs: Self::DEFAULT_CHALLENGE_DURATION_SECS,
            validator_reward_percentage: 30,
            challenge_deposit: Amount::from_milli(100),
            challenge_deposit_policy: ChallengeDepositPolicy::default(),

            auction_duration_secs: Self::DEFAULT_AUCTION_DURATION_SECS,
            min_validator_stake: Amount::from_milli(500),
            min_validator_reputation: 100,
            base_reputation: 100,
            boosted_reputation: 200,
        }
    }

    /// Reject parameter sets that would break escrow or liveness invariants.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.validator_reward_percentage > 100 {
            return Err(TypesError::InvalidParam {
                name: "validator_reward_percentage",
                reason: format!("{} exceeds 100", self.validator_reward_percentage),
            });
        }
        if self.challenge_duration_secs == 0 {
            return Err(TypesError::InvalidParam {
                name: "challenge_duration_secs",
                reason: "must be non-zero".into(),
            });
        }
        if self.auction_duration_secs == 0 {
            return Err(TypesError::InvalidParam {
                name: "auction_duration_secs",
                reason: "must be non-zero".into(),
            });
        }
        if self.challenge_deposit.is_zero() {
            return Err(TypesError::InvalidParam {
                name: "challenge_deposit",
                reason: "must be non-zero".into(),
            });
        }
        Ok(())
    }
}

/// Default is the observed production configuration.
impl Default for ProtocolParams {
    fn default() -> Self {
        Self::observed_defaults()
    }
}
