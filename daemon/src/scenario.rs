//! The reference lifecycle, run end to end against an in-process deployment.

use anyhow::Context;
use poi_ledger::CallContext;
use poi_node::{Deployment, NodeConfig};
use poi_nullables::NullClock;
use poi_settlement::ChallengeVerdict;
use poi_types::{Address, Amount, PoiId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const SCENARIO_START: u64 = 1_700_000_000;

#[derive(Debug, Serialize)]
pub struct BalanceChange {
    pub account: String,
    pub address: Address,
    pub before: Amount,
    pub after: Amount,
    /// Signed difference, e.g. `+0.7` or `-1`.
    pub delta: String,
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub poi_id: PoiId,
    pub winner: Option<Address>,
    pub validator_reward: Amount,
    pub challenge_accepted: bool,
    pub final_status: String,
    /// Owner balance change across challenge resolution alone.
    pub owner_resolution_delta: String,
    /// Settlement-chain balances from before registration to the end.
    pub settlement_balances: Vec<BalanceChange>,
    pub registry_escrow: Amount,
    pub value_conserved: bool,
}

fn signed_delta(before: Amount, after: Amount) -> String {
    if after >= before {
        format!("+{}", after - before)
    } else {
        format!("-{}", before - after)
    }
}

/// Register → auction → resolve → challenge → window → verdict.
pub fn run(config: &NodeConfig, accept: bool) -> anyhow::Result<ScenarioReport> {
    let clock = Arc::new(NullClock::new(SCENARIO_START));
    let mut d = Deployment::bootstrap(config, clock.clone()).context("bootstrap failed")?;
    let params = config.params.clone();
    let (l1, l2) = (config.settlement_chain_id, config.execution_chain_id);

    let owner = Address::derive("owner");
    let validator = Address::derive("validator");
    let challenger = Address::derive("challenger");
    d.fund(l1, owner, Amount::from_units(10))?;
    d.fund(l1, challenger, Amount::from_units(10))?;
    d.fund(l2, validator, Amount::from_units(10))?;

    let accounts = [("owner", owner), ("validator", validator), ("challenger", challenger)];
    let before: Vec<Amount> = accounts
        .iter()
        .map(|(_, a)| d.settlement.ledger.balance_of(a))
        .collect();

    let exec = &mut d.execution;
    exec.validators.register_validator(
        &mut exec.ledger,
        &CallContext::with_value(validator, params.min_validator_stake),
        b"attestation",
    )?;

    let s = &mut d.settlement;
    let stake = Amount::from_units(1);
    let poi_id = s.registry.register_poi(
        &mut s.ledger,
        &CallContext::with_value(owner, stake),
        "Test POI",
        stake,
    )?;
    d.pump()?;

    let exec = &mut d.execution;
    exec.auction
        .enter(&exec.ledger, &exec.validators, &validator, poi_id)?;
    clock.advance(params.auction_duration_secs);
    let winner = d
        .settle_due()?
        .into_iter()
        .find(|(id, _)| *id == poi_id)
        .and_then(|(_, w)| w);
    let winner_addr = winner.context("auction ended without a winner")?;

    let exec = &mut d.execution;
    exec.auction
        .submit_proof(&mut exec.validators, &winner_addr, poi_id, b"site survey".to_vec())?;
    d.pump()?;

    let s = &mut d.settlement;
    let validator_reward = s
        .registry
        .get_poi(poi_id)
        .map(|p| p.reward_paid())
        .unwrap_or_default();
    s.registry.challenge_poi(
        &mut s.ledger,
        &CallContext::with_value(challenger, params.challenge_deposit),
        poi_id,
    )?;
    clock.advance(params.challenge_duration_secs);

    let owner_before_verdict = s.ledger.balance_of(&owner);
    let verdict = s
        .registry
        .resolve_poi_challenge(&mut s.ledger, &config.admin, poi_id, accept)?;
    let owner_resolution_delta = signed_delta(owner_before_verdict, s.ledger.balance_of(&owner));
    match &verdict {
        ChallengeVerdict::Upheld { refund, .. } => tracing::info!(poi_id, %refund, "scenario: challenge upheld"),
        ChallengeVerdict::Dismissed { deposit_payee, .. } => {
            tracing::info!(poi_id, payee = %deposit_payee, "scenario: challenge dismissed")
        }
    }

    let final_status = s
        .registry
        .get_poi(poi_id)
        .map(|p| p.status().to_string())
        .unwrap_or_default();
    let settlement_balances = accounts
        .iter()
        .zip(before)
        .map(|((name, addr), before)| {
            let after = s.ledger.balance_of(addr);
            BalanceChange {
                account: (*name).to_string(),
                address: *addr,
                before,
                after,
                delta: signed_delta(before, after),
            }
        })
        .collect();
    let summary = s.ledger.summary();

    Ok(ScenarioReport {
        poi_id,
        winner,
        validator_reward,
        challenge_accepted: accept,
        final_status,
        owner_resolution_delta,
        settlement_balances,
        registry_escrow: s.ledger.balance_of(&s.registry.address()),
        value_conserved: summary.supply == summary.circulating,
    })
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "POI {} -> {}", self.poi_id, self.final_status)?;
        if let Some(winner) = &self.winner {
            writeln!(f, "  auction winner:     {winner}")?;
        }
        writeln!(f, "  validator reward:   {}", self.validator_reward)?;
        writeln!(f, "  challenge accepted: {}", self.challenge_accepted)?;
        writeln!(f, "  owner delta at verdict: {}", self.owner_resolution_delta)?;
        writeln!(f, "  settlement balances:")?;
        for b in &self.settlement_balances {
            writeln!(f, "    {:<10} {} -> {} ({})", b.account, b.before, b.after, b.delta)?;
        }
        writeln!(f, "  registry escrow:    {}", self.registry_escrow)?;
        write!(f, "  value conserved:    {}", self.value_conserved)
    }
}
