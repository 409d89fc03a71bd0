//! Escrow conservation across the full POI lifecycle.
//!
//! For any stake, attached value, deposit policy and verdict, the registry's
//! ledger balance always equals what it still owes, no value is created or
//! destroyed, and the validator reward plus the owner refund never exceed the
//! declared stake.

use poi_binding::ChainBinding;
use poi_ledger::{CallContext, Ledger, Origin, OwnerAccess};
use poi_nullables::NullClock;
use poi_settlement::{ChallengeVerdict, PoiRegistry, PoiStatus};
use poi_types::{Address, Amount, ChainId, ChallengeDepositPolicy, ProtocolParams};
use proptest::prelude::*;
use std::sync::Arc;

const FUNDS: u128 = 1_000_000_000_000_000_000_000;

fn policy_strategy() -> impl Strategy<Value = ChallengeDepositPolicy> {
    prop_oneof![
        Just(ChallengeDepositPolicy::ReturnToChallenger),
        Just(ChallengeDepositPolicy::ForfeitToOwner),
        Just(ChallengeDepositPolicy::ForfeitToValidator),
    ]
}

fn assert_conserved(ledger: &Ledger, registry: &PoiRegistry) -> Result<(), TestCaseError> {
    let summary = ledger.summary();
    prop_assert_eq!(summary.supply, summary.circulating);
    prop_assert_eq!(
        ledger.balance_of(&registry.address()),
        registry.escrow_liabilities()
    );
    Ok(())
}

proptest! {
    #[test]
    fn lifecycle_conserves_value(
        stake in 1u128..FUNDS / 4,
        extra in 0u128..FUNDS / 4,
        reward_pct in 0u8..=100,
        policy in policy_strategy(),
        accept in any::<bool>(),
    ) {
        let params = ProtocolParams {
            validator_reward_percentage: reward_pct,
            challenge_deposit_policy: policy,
            ..ProtocolParams::default()
        };
        let clock = Arc::new(NullClock::new(0));
        let mut ledger = Ledger::new(ChainId::DEV_SETTLEMENT, clock.clone());
        let admin = Address::derive("admin");
        let owner = Address::derive("owner");
        let validator = Address::derive("validator");
        let challenger = Address::derive("challenger");
        ledger.mint(owner, Amount::new(FUNDS)).unwrap();
        ledger.mint(challenger, Amount::new(FUNDS)).unwrap();

        let mut registry = PoiRegistry::new(
            Address::derive("registry"),
            &params,
            Arc::new(OwnerAccess::new(admin)),
            ChainBinding::new(ChainId::DEV_SETTLEMENT, ChainId::DEV_EXECUTION, Address::derive("auction")),
        );

        let stake = Amount::new(stake);
        let attached = Amount::new(stake.raw() + extra);
        let id = registry
            .register_poi(&mut ledger, &CallContext::with_value(owner, attached), "POI", stake)
            .unwrap();
        assert_conserved(&ledger, &registry)?;

        let reward = registry
            .resolve_poi(&mut ledger, &Origin::Account(admin), id, validator, vec![1, 2, 3])
            .unwrap();
        prop_assert!(reward <= stake);
        assert_conserved(&ledger, &registry)?;

        registry
            .challenge_poi(&mut ledger, &CallContext::with_value(challenger, params.challenge_deposit), id)
            .unwrap();
        assert_conserved(&ledger, &registry)?;

        clock.advance(params.challenge_duration_secs);
        let verdict = registry
            .resolve_poi_challenge(&mut ledger, &admin, id, accept)
            .unwrap();
        assert_conserved(&ledger, &registry)?;

        let poi = registry.get_poi(id).unwrap();
        if let ChallengeVerdict::Upheld { refund, .. } = verdict {
            prop_assert!(reward.checked_add(refund).unwrap() <= stake);
            prop_assert_eq!(reward + refund, stake);
            prop_assert_eq!(poi.status(), PoiStatus::Rejected);
        } else {
            prop_assert_eq!(poi.status(), PoiStatus::Verified);
        }

        // Whatever is left unreserved belongs to the owner.
        if !poi.claimable().is_zero() {
            registry.claim_escrow(&mut ledger, &owner, id).unwrap();
            assert_conserved(&ledger, &registry)?;
        }
    }
}
