//! Pluggable reputation assessment.
//!
//! The protocol only observes *that* a validator presented a reputation proof,
//! not how it is verified. Real attestation schemes plug in behind
//! [`ReputationAssessor`] without touching the registry.

use poi_types::{Address, ProtocolParams};

/// Turns a registration's reputation proof into an initial reputation score.
pub trait ReputationAssessor: Send + Sync {
    /// Human-readable name of this assessor.
    fn name(&self) -> &str;

    /// Score for `validator` registering with `proof` (possibly empty).
    fn assess(&self, validator: &Address, proof: &[u8]) -> u64;
}

/// Grants the boosted score to any non-empty proof, the base score otherwise.
///
/// The proof bytes are not verified.
#[derive(Clone, Copy, Debug)]
pub struct PresenceAssessor {
    base: u64,
    boosted: u64,
}

impl PresenceAssessor {
    pub fn new(base: u64, boosted: u64) -> Self {
        Self { base, boosted }
    }

    pub fn from_params(params: &ProtocolParams) -> Self {
        Self::new(params.base_reputation, params.boosted_reputation)
    }
}

impl ReputationAssessor for PresenceAssessor {
    fn name(&self) -> &str {
        "presence"
    }

    fn assess(&self, _validator: &Address, proof: &[u8]) -> u64 {
        if proof.is_empty() {
            self.base
        } else {
            self.boosted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_of_bytes_boosts() {
        let a = PresenceAssessor::from_params(&ProtocolParams::default());
        let v = Address::derive("v");
        assert_eq!(a.assess(&v, b""), 100);
        assert_eq!(a.assess(&v, b"anything"), 200);
    }
}
