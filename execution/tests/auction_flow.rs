//! End-to-end auction behaviour on a single execution ledger.

use poi_binding::ChainBinding;
use poi_execution::{
    AuctionState, AuctionStatus, ExecutionError, ExecutionEvent, PresenceAssessor,
    ReputationStakeAge, ValidatorRegistry, VerificationAuction, VerificationRequest,
};
use poi_ledger::{CallContext, Ledger, Origin, OwnerAccess};
use poi_nullables::NullClock;
use poi_types::{Address, Amount, ChainId, ProofDigest, ProtocolParams, Timestamp};
use std::sync::Arc;

const START: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

struct Fixture {
    clock: Arc<NullClock>,
    ledger: Ledger,
    validators: ValidatorRegistry,
    auction: VerificationAuction,
}

fn settlement_contract() -> Address {
    Address::derive("registry")
}

fn relayed() -> Origin {
    Origin::Remote {
        chain: ChainId::DEV_SETTLEMENT,
        sender: settlement_contract(),
    }
}

fn request(poi_id: u64) -> VerificationRequest {
    VerificationRequest {
        poi_id,
        name: "Test POI".into(),
        owner: Address::derive("owner"),
        stake_amount: Amount::from_units(1),
    }
}

fn fixture() -> Fixture {
    let params = ProtocolParams::default();
    let clock = Arc::new(NullClock::new(START));
    let mut ledger = Ledger::new(ChainId::DEV_EXECUTION, clock.clone());
    for name in ["alice", "bob", "carol"] {
        ledger.mint(Address::derive(name), Amount::from_units(5)).unwrap();
    }
    let validators = ValidatorRegistry::new(
        Address::derive("validators"),
        params.min_validator_stake,
        Box::new(PresenceAssessor::from_params(&params)),
    );
    let auction = VerificationAuction::new(
        Address::derive("auction"),
        &params,
        Arc::new(OwnerAccess::new(Address::derive("admin"))),
        ChainBinding::new(ChainId::DEV_EXECUTION, ChainId::DEV_SETTLEMENT, settlement_contract()),
        Box::new(ReputationStakeAge),
    );
    Fixture {
        clock,
        ledger,
        validators,
        auction,
    }
}

impl Fixture {
    fn register(&mut self, name: &str, stake_milli: u128, proof: &[u8]) -> Address {
        let addr = Address::derive(name);
        self.validators
            .register_validator(
                &mut self.ledger,
                &CallContext::with_value(addr, Amount::from_milli(stake_milli)),
                proof,
            )
            .unwrap();
        addr
    }

    fn enter(&mut self, who: &Address, poi_id: u64) -> Result<(), ExecutionError> {
        self.auction.enter(&self.ledger, &self.validators, who, poi_id)
    }

    fn settle(&mut self, poi_id: u64) -> Result<Option<Address>, ExecutionError> {
        self.auction.settle(&self.ledger, &self.validators, poi_id)
    }
}

#[test]
fn open_requires_bound_settlement_contract() {
    let mut f = fixture();
    let impostor = Origin::Remote {
        chain: ChainId::DEV_SETTLEMENT,
        sender: Address::derive("impostor"),
    };
    assert!(matches!(
        f.auction.open(&f.ledger, &impostor, request(1)),
        Err(ExecutionError::UntrustedPeer { .. })
    ));
    assert!(matches!(
        f.auction.open(&f.ledger, &Origin::Account(Address::derive("admin")), request(1)),
        Err(ExecutionError::UntrustedPeer { .. })
    ));
    assert!(f.auction.auction(1).is_none());

    let ends_at = f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    assert_eq!(ends_at, Timestamp::new(START + DAY));
}

#[test]
fn duplicate_request_is_refused() {
    let mut f = fixture();
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    assert_eq!(
        f.auction.open(&f.ledger, &relayed(), request(1)),
        Err(ExecutionError::AuctionExists {
            poi_id: 1,
            status: AuctionStatus::Open
        })
    );
}

#[test]
fn highest_reputation_entrant_wins() {
    let mut f = fixture();
    let alice = f.register("alice", 2_000, b"");
    let bob = f.register("bob", 500, b"attestation");
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    f.enter(&alice, 1).unwrap();
    f.enter(&bob, 1).unwrap();

    f.clock.advance(DAY);
    assert_eq!(f.settle(1), Ok(Some(bob)));
    assert_eq!(
        f.auction.auction(1).unwrap().state,
        AuctionState::Awarded { winner: bob }
    );
}

#[test]
fn stake_then_registration_order_break_ties() {
    let mut f = fixture();
    let alice = f.register("alice", 500, b"");
    let bob = f.register("bob", 500, b"");
    let carol = f.register("carol", 900, b"");

    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    f.auction.open(&f.ledger, &relayed(), request(2)).unwrap();
    for who in [&bob, &alice, &carol] {
        f.enter(who, 1).unwrap();
    }
    for who in [&bob, &alice] {
        f.enter(who, 2).unwrap();
    }
    f.clock.advance(DAY);
    assert_eq!(f.settle(1), Ok(Some(carol)));
    assert_eq!(f.settle(2), Ok(Some(alice)));
}

#[test]
fn unregistered_caller_cannot_enter() {
    let mut f = fixture();
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    let stranger = Address::derive("stranger");
    assert_eq!(f.enter(&stranger, 1), Err(ExecutionError::NotRegistered(stranger)));
}

#[test]
fn entries_close_with_the_window() {
    let mut f = fixture();
    let alice = f.register("alice", 500, b"");
    let bob = f.register("bob", 500, b"");
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();

    f.clock.advance(DAY - 1);
    f.enter(&alice, 1).unwrap();
    assert_eq!(
        f.enter(&alice, 1),
        Err(ExecutionError::AlreadyEntered {
            poi_id: 1,
            validator: alice
        })
    );
    f.clock.advance(1);
    assert_eq!(f.enter(&bob, 1), Err(ExecutionError::AuctionClosed(1)));
}

#[test]
fn settle_waits_for_the_window() {
    let mut f = fixture();
    let alice = f.register("alice", 500, b"");
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    f.enter(&alice, 1).unwrap();

    f.clock.advance(DAY - 1);
    assert_eq!(
        f.settle(1),
        Err(ExecutionError::AuctionWindowOpen {
            poi_id: 1,
            ends_at: Timestamp::new(START + DAY)
        })
    );
    assert!(f.auction.due(f.ledger.now()).is_empty());

    f.clock.advance(1);
    assert_eq!(f.auction.due(f.ledger.now()), vec![1]);
    assert_eq!(f.settle(1), Ok(Some(alice)));
    assert!(matches!(f.settle(1), Err(ExecutionError::InvalidState { .. })));
}

#[test]
fn empty_auction_fails_and_can_be_reopened() {
    let mut f = fixture();
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    f.clock.advance(DAY);
    assert_eq!(f.settle(1), Ok(None));
    assert_eq!(f.auction.auction(1).unwrap().status(), AuctionStatus::Failed);

    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    let reopened = f.auction.auction(1).unwrap();
    assert_eq!(reopened.attempt, 2);
    assert_eq!(reopened.status(), AuctionStatus::Open);
    assert!(reopened.entrants.is_empty());

    let events = f.auction.drain_events();
    assert!(events.contains(&ExecutionEvent::AuctionFailed { poi_id: 1, attempt: 1 }));
}

#[test]
fn only_the_winner_submits_proof_once() {
    let mut f = fixture();
    let alice = f.register("alice", 500, b"x");
    let bob = f.register("bob", 500, b"");
    f.auction.open(&f.ledger, &relayed(), request(1)).unwrap();
    assert!(matches!(
        f.auction.submit_proof(&mut f.validators, &alice, 1, b"early".to_vec()),
        Err(ExecutionError::InvalidState { .. })
    ));
    f.enter(&alice, 1).unwrap();
    f.enter(&bob, 1).unwrap();
    f.clock.advance(DAY);
    f.settle(1).unwrap();
    f.auction.drain_events();

    assert_eq!(
        f.auction.submit_proof(&mut f.validators, &bob, 1, b"proof".to_vec()),
        Err(ExecutionError::NotWinner { poi_id: 1, caller: bob })
    );
    let digest = f
        .auction
        .submit_proof(&mut f.validators, &alice, 1, b"proof".to_vec())
        .unwrap();
    assert_eq!(digest, ProofDigest::of(b"proof"));
    assert_eq!(f.validators.validator(&alice).unwrap().total_verified, 1);
    assert_eq!(
        f.auction.drain_events(),
        vec![ExecutionEvent::ResolutionReady {
            poi_id: 1,
            winner: alice,
            proof: b"proof".to_vec(),
            destination_chain: ChainId::DEV_SETTLEMENT,
            destination_contract: Some(settlement_contract()),
        }]
    );

    assert!(matches!(
        f.auction.submit_proof(&mut f.validators, &alice, 1, b"proof".to_vec()),
        Err(ExecutionError::InvalidState { .. })
    ));
    assert_eq!(f.validators.validator(&alice).unwrap().total_verified, 1);
}

#[test]
fn views_expose_configuration() {
    let f = fixture();
    assert_eq!(f.auction.auction_duration(), DAY);
    assert_eq!(f.auction.min_validator_reputation(), 100);
    assert_eq!(f.auction.min_validator_stake(), Amount::from_milli(500));
    assert_eq!(f.auction.l1_origin_contract(), Some(settlement_contract()));
    assert_eq!(f.auction.l1_chain_id(), ChainId::DEV_SETTLEMENT);
    assert_eq!(f.auction.selection_policy(), "reputation-stake-age");
}

#[test]
fn l1_contract_binds_once_by_admin() {
    let params = ProtocolParams::default();
    let admin = Address::derive("admin");
    let mut auction = VerificationAuction::new(
        Address::derive("auction"),
        &params,
        Arc::new(OwnerAccess::new(admin)),
        ChainBinding::unbound(ChainId::DEV_EXECUTION, ChainId::DEV_SETTLEMENT),
        Box::new(ReputationStakeAge),
    );
    assert!(auction
        .update_l1_contract(&Address::derive("mallory"), settlement_contract())
        .is_err());
    auction.update_l1_contract(&admin, settlement_contract()).unwrap();
    assert_eq!(auction.l1_origin_contract(), Some(settlement_contract()));
    assert!(auction.update_l1_contract(&admin, Address::derive("other")).is_err());
}
