//! Auction winner selection.

use crate::validators::Validator;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use poi_types::PoiId;
use std::cmp::Ordering;

/// Orders auction entrants; the smallest entrant wins.
pub trait SelectionPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// `Less` when `a` should be preferred over `b` for `poi_id`.
    fn compare(&self, poi_id: PoiId, a: &Validator, b: &Validator) -> Ordering;

    /// Pick the winner among `candidates`, or `None` if there are none.
    fn select<'a>(&self, poi_id: PoiId, candidates: &[&'a Validator]) -> Option<&'a Validator> {
        candidates
            .iter()
            .copied()
            .min_by(|a, b| self.compare(poi_id, a, b))
    }
}

/// Highest reputation, then highest stake, then earliest registration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReputationStakeAge;

impl SelectionPolicy for ReputationStakeAge {
    fn name(&self) -> &str {
        "reputation-stake-age"
    }

    fn compare(&self, _poi_id: PoiId, a: &Validator, b: &Validator) -> Ordering {
        b.reputation
            .cmp(&a.reputation)
            .then_with(|| b.staked_amount.cmp(&a.staked_amount))
            .then_with(|| a.sequence.cmp(&b.sequence))
    }
}

/// Deterministic pseudo-random selection.
///
/// Each entrant scores `Blake2b(seed || poi_id || address)`; the lowest score
/// wins. Anyone holding the seed can recompute the outcome.
#[derive(Clone, Copy, Debug)]
pub struct SeededPolicy {
    seed: [u8; 32],
}

impl SeededPolicy {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    fn score(&self, poi_id: PoiId, validator: &Validator) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.seed);
        hasher.update(poi_id.to_be_bytes());
        hasher.update(validator.address.as_bytes());
        hasher.finalize().into()
    }
}

impl SelectionPolicy for SeededPolicy {
    fn name(&self) -> &str {
        "seeded"
    }

    fn compare(&self, poi_id: PoiId, a: &Validator, b: &Validator) -> Ordering {
        self.score(poi_id, a)
            .cmp(&self.score(poi_id, b))
            .then_with(|| a.sequence.cmp(&b.sequence))
    }
}
