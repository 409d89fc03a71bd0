//! Full lifecycle across both chains, driven through the encoded relay.

use poi_execution::AuctionStatus;
use poi_ledger::CallContext;
use poi_nullables::NullClock;
use poi_node::{DeliveryOutcome, Deployment, NodeConfig};
use poi_relay::{Envelope, Message, PROTOCOL_VERSION};
use poi_settlement::{ChallengeVerdict, PoiStatus};
use poi_types::{Address, Amount, ProtocolParams};
use std::sync::Arc;

const START: u64 = 1_700_000_000;

struct Harness {
    clock: Arc<NullClock>,
    d: Deployment,
    config: NodeConfig,
    owner: Address,
    validator: Address,
    challenger: Address,
}

fn harness() -> Harness {
    let config = NodeConfig::default();
    let clock = Arc::new(NullClock::new(START));
    let mut d = Deployment::bootstrap(&config, clock.clone()).unwrap();
    let owner = Address::derive("owner");
    let validator = Address::derive("validator");
    let challenger = Address::derive("challenger");
    d.fund(config.settlement_chain_id, owner, Amount::from_units(10)).unwrap();
    d.fund(config.settlement_chain_id, challenger, Amount::from_units(10)).unwrap();
    d.fund(config.execution_chain_id, validator, Amount::from_units(10)).unwrap();
    Harness {
        clock,
        d,
        config,
        owner,
        validator,
        challenger,
    }
}

impl Harness {
    fn register_validator(&mut self, proof: &[u8]) {
        let exec = &mut self.d.execution;
        exec.validators
            .register_validator(
                &mut exec.ledger,
                &CallContext::with_value(self.validator, Amount::from_milli(500)),
                proof,
            )
            .unwrap();
    }

    fn register_poi(&mut self) -> u64 {
        let s = &mut self.d.settlement;
        s.registry
            .register_poi(
                &mut s.ledger,
                &CallContext::with_value(self.owner, Amount::from_units(1)),
                "Test POI",
                Amount::from_units(1),
            )
            .unwrap()
    }

    /// Register a POI and run it through the auction until it is verified.
    fn verified_poi(&mut self) -> u64 {
        self.register_validator(b"attestation");
        let id = self.register_poi();
        let report = self.d.pump().unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(
            self.d.execution.auction.auction(id).map(|a| a.status()),
            Some(AuctionStatus::Open)
        );

        let exec = &mut self.d.execution;
        exec.auction
            .enter(&exec.ledger, &exec.validators, &self.validator, id)
            .unwrap();
        self.clock.advance(ProtocolParams::DEFAULT_AUCTION_DURATION_SECS);
        assert_eq!(self.d.settle_due().unwrap(), vec![(id, Some(self.validator))]);

        let exec = &mut self.d.execution;
        exec.auction
            .submit_proof(&mut exec.validators, &self.validator, id, b"site photos".to_vec())
            .unwrap();
        let report = self.d.pump().unwrap();
        assert_eq!(report.applied, 1);
        id
    }
}

#[test]
fn bootstrap_binds_both_sides() {
    let h = harness();
    assert_eq!(
        h.d.settlement.registry.l2_destination_contract(),
        Some(h.config.auction_address)
    );
    assert_eq!(h.d.settlement.registry.l2_chain_id(), h.config.execution_chain_id);
    assert_eq!(
        h.d.execution.auction.l1_origin_contract(),
        Some(h.config.registry_address)
    );
    assert_eq!(h.d.execution.auction.l1_chain_id(), h.config.settlement_chain_id);
}

#[test]
fn relayed_resolution_pays_validator_on_settlement_chain() {
    let mut h = harness();
    let before = h.d.settlement.ledger.balance_of(&h.validator);
    let id = h.verified_poi();

    let poi = h.d.settlement.registry.get_poi(id).unwrap();
    assert_eq!(poi.status(), PoiStatus::Verified);
    assert!(poi.verified());
    assert_eq!(poi.validator(), Some(h.validator));
    assert_eq!(poi.proof(), Some(&b"site photos"[..]));
    assert_eq!(
        h.d.settlement.ledger.balance_of(&h.validator),
        before + Amount::from_milli(300)
    );
    assert_eq!(
        h.d.execution.validators.validator(&h.validator).unwrap().total_verified,
        1
    );
}

#[test]
fn full_scenario_refunds_owner_seventy_percent() {
    let mut h = harness();
    let id = h.verified_poi();

    let s = &mut h.d.settlement;
    s.registry
        .challenge_poi(
            &mut s.ledger,
            &CallContext::with_value(h.challenger, Amount::from_milli(100)),
            id,
        )
        .unwrap();
    assert!(s.registry.get_poi(id).unwrap().challenged());

    h.clock.advance(3 * 24 * 3600);
    let owner_before = s.ledger.balance_of(&h.owner);
    let challenger_before = s.ledger.balance_of(&h.challenger);
    let verdict = s
        .registry
        .resolve_poi_challenge(&mut s.ledger, &h.config.admin, id, false)
        .unwrap();
    assert!(matches!(verdict, ChallengeVerdict::Upheld { .. }));

    let poi = s.registry.get_poi(id).unwrap();
    assert_eq!(poi.status(), PoiStatus::Rejected);
    assert!(!poi.verified());
    assert_eq!(s.ledger.balance_of(&h.owner), owner_before + Amount::from_milli(700));
    assert_eq!(
        s.ledger.balance_of(&h.challenger),
        challenger_before + Amount::from_milli(100)
    );
    assert_eq!(s.ledger.balance_of(&s.registry.address()), Amount::ZERO);

    let summary = s.ledger.summary();
    assert_eq!(summary.supply, summary.circulating);
}

#[test]
fn redelivered_resolution_pays_once() {
    let mut h = harness();
    h.register_validator(b"");
    let id = h.register_poi();
    h.d.pump().unwrap();
    let exec = &mut h.d.execution;
    exec.auction
        .enter(&exec.ledger, &exec.validators, &h.validator, id)
        .unwrap();
    h.clock.advance(ProtocolParams::DEFAULT_AUCTION_DURATION_SECS);
    h.d.settle_due().unwrap();
    let exec = &mut h.d.execution;
    exec.auction
        .submit_proof(&mut exec.validators, &h.validator, id, b"proof".to_vec())
        .unwrap();

    let frames = h.d.flush().unwrap();
    assert_eq!(frames.len(), 1);
    let before = h.d.settlement.ledger.balance_of(&h.validator);
    assert_eq!(h.d.deliver(&frames[0]).unwrap(), DeliveryOutcome::Applied);
    assert_eq!(h.d.deliver(&frames[0]).unwrap(), DeliveryOutcome::Duplicate);
    assert_eq!(
        h.d.settlement.ledger.balance_of(&h.validator),
        before + Amount::from_milli(300)
    );

    // A fresh envelope carrying the same resolution is refused by the registry itself.
    let mut replay = Envelope::decode(&frames[0]).unwrap();
    replay.nonce += 100;
    let outcome = h.d.deliver(&replay.encode().unwrap()).unwrap();
    assert!(matches!(outcome, DeliveryOutcome::Rejected(_)));
    assert_eq!(
        h.d.settlement.ledger.balance_of(&h.validator),
        before + Amount::from_milli(300)
    );
    assert_eq!(h.d.metrics().envelopes_duplicate.get(), 1);
    assert_eq!(h.d.metrics().deliveries_rejected.get(), 1);
}

#[test]
fn forged_resolution_is_rejected() {
    let mut h = harness();
    let id = h.register_poi();
    h.d.pump().unwrap();

    let forged = Envelope {
        version: PROTOCOL_VERSION,
        source_chain: h.config.execution_chain_id,
        source_contract: Address::derive("impostor"),
        destination_chain: h.config.settlement_chain_id,
        nonce: 0,
        message: Message::Resolution {
            poi_id: id,
            validator: Address::derive("impostor"),
            proof: b"fake".to_vec(),
        },
    };
    let outcome = h.d.deliver(&forged.encode().unwrap()).unwrap();
    assert!(matches!(outcome, DeliveryOutcome::Rejected(reason) if reason.contains("untrusted")));
    assert_eq!(
        h.d.settlement.registry.get_poi(id).unwrap().status(),
        PoiStatus::Verifying
    );
}

#[test]
fn empty_auction_fails_and_reopens() {
    let mut h = harness();
    let id = h.register_poi();
    h.d.pump().unwrap();
    h.clock.advance(ProtocolParams::DEFAULT_AUCTION_DURATION_SECS);
    assert_eq!(h.d.settle_due().unwrap(), vec![(id, None)]);

    let report = h.d.pump().unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.applied, 1);
    assert_eq!(h.d.metrics().auctions_failed.get(), 1);
    let auction = h.d.execution.auction.auction(id).unwrap();
    assert_eq!(auction.status(), AuctionStatus::Open);
    assert_eq!(auction.attempt, 2);
    assert_eq!(
        h.d.settlement.registry.get_poi(id).unwrap().status(),
        PoiStatus::Verifying
    );
    assert!(h.d.pump().unwrap().is_idle());
}

#[test]
fn late_validator_wins_reopened_auction() {
    let mut h = harness();
    let id = h.register_poi();
    h.d.pump().unwrap();
    h.clock.advance(ProtocolParams::DEFAULT_AUCTION_DURATION_SECS);
    assert_eq!(h.d.settle_due().unwrap(), vec![(id, None)]);
    h.d.pump().unwrap();

    h.register_validator(b"attestation");
    let exec = &mut h.d.execution;
    exec.auction
        .enter(&exec.ledger, &exec.validators, &h.validator, id)
        .unwrap();
    h.clock.advance(ProtocolParams::DEFAULT_AUCTION_DURATION_SECS);
    assert_eq!(h.d.settle_due().unwrap(), vec![(id, Some(h.validator))]);
    assert_eq!(h.d.execution.auction.auction(id).unwrap().attempt, 2);

    let exec = &mut h.d.execution;
    exec.auction
        .submit_proof(&mut exec.validators, &h.validator, id, b"site photos".to_vec())
        .unwrap();
    // Counted on submission, before the settlement chain has seen the proof.
    assert_eq!(
        h.d.execution.validators.validator(&h.validator).unwrap().total_verified,
        1
    );
    assert_eq!(
        h.d.settlement.registry.get_poi(id).unwrap().status(),
        PoiStatus::Verifying
    );
    assert_eq!(h.d.pump().unwrap().applied, 1);

    let poi = h.d.settlement.registry.get_poi(id).unwrap();
    assert_eq!(poi.status(), PoiStatus::Verified);
    assert_eq!(poi.validator(), Some(h.validator));
    assert_eq!(h.d.metrics().auctions_awarded.get(), 1);
}

#[test]
fn message_sent_to_the_wrong_chain_is_rejected() {
    let mut h = harness();
    let id = h.register_poi();
    h.d.pump().unwrap();

    let stray = Envelope {
        version: PROTOCOL_VERSION,
        source_chain: h.config.settlement_chain_id,
        source_contract: h.config.registry_address,
        destination_chain: h.config.execution_chain_id,
        nonce: 99,
        message: Message::Resolution {
            poi_id: id,
            validator: h.validator,
            proof: b"photos".to_vec(),
        },
    };
    let outcome = h.d.deliver(&stray.encode().unwrap()).unwrap();
    assert!(matches!(outcome, DeliveryOutcome::Rejected(_)));
    assert_eq!(h.d.metrics().deliveries_rejected.get(), 1);
    assert_eq!(
        h.d.settlement.registry.get_poi(id).unwrap().status(),
        PoiStatus::Verifying
    );
    assert!(h.d.pump().unwrap().is_idle());
}

#[test]
fn garbage_frame_is_a_relay_error() {
    let mut h = harness();
    assert!(matches!(
        h.d.deliver(&[0xff; 7]),
        Err(poi_node::NodeError::Relay(_))
    ));
}
