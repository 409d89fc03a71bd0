use poi_execution::{ReputationStakeAge, SeededPolicy, SelectionPolicy, Validator};
use poi_types::{Address, Amount, Timestamp};
use proptest::prelude::*;

fn pool(entries: &[(u64, u128)]) -> Vec<Validator> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (reputation, stake))| Validator {
            address: Address::derive(&format!("v{i}")),
            staked_amount: Amount::new(*stake),
            reputation: *reputation,
            total_verified: 0,
            registered_at: Timestamp::new(i as u64),
            sequence: i as u64,
        })
        .collect()
}

proptest! {
    /// No other entrant beats the winner on (reputation, stake), and full ties
    /// go to the earliest registration.
    #[test]
    fn winner_dominates_pool(entries in prop::collection::vec((0u64..4, 0u128..4), 1..20)) {
        let validators = pool(&entries);
        let refs: Vec<&Validator> = validators.iter().collect();
        let winner = ReputationStakeAge.select(1, &refs).unwrap();
        for v in &validators {
            let key = (v.reputation, v.staked_amount);
            let best = (winner.reputation, winner.staked_amount);
            prop_assert!(key <= best);
            if key == best {
                prop_assert!(winner.sequence <= v.sequence);
            }
        }
    }

    /// Seeded selection ignores the order candidates are presented in.
    #[test]
    fn seeded_winner_is_order_independent(n in 1usize..20, seed in any::<[u8; 32]>()) {
        let validators = pool(&vec![(100, 1); n]);
        let forward: Vec<&Validator> = validators.iter().collect();
        let backward: Vec<&Validator> = validators.iter().rev().collect();
        let policy = SeededPolicy::new(seed);
        prop_assert_eq!(
            policy.select(7, &forward).map(|v| v.address),
            policy.select(7, &backward).map(|v| v.address)
        );
    }
}
