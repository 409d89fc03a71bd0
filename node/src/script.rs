//! Operation scripts replayed into a running deployment.
//!
//! A script is a TOML file of `[[step]]` tables. Each step names its contract
//! call with `op` and becomes due once `after_secs` seconds of ledger time
//! have passed since the runner started:
//!
//! ```toml
//! [[step]]
//! op = "register_poi"
//! account = "alice"
//! name = "Corner bakery"
//! stake = "1"
//!
//! [[step]]
//! after_secs = 60
//! op = "enter_auction"
//! account = "validator-1"
//! poi_id = 1
//! ```
//!
//! Accounts are either `0x`-prefixed addresses or labels, which map to
//! [`Address::derive`] so the same label always names the same account.

use crate::deployment::Deployment;
use crate::error::NodeError;
use poi_ledger::CallContext;
use poi_types::{Address, Amount, PoiId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainSide {
    Settlement,
    Execution,
}

/// One contract call, made on behalf of `account` where the call has a caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Dev faucet credit.
    Fund {
        chain: ChainSide,
        account: String,
        amount: Amount,
    },
    RegisterValidator {
        account: String,
        stake: Amount,
        #[serde(default)]
        reputation_proof: String,
    },
    RegisterPoi {
        account: String,
        name: String,
        stake: Amount,
        /// Attached value; the stake itself when absent.
        #[serde(default)]
        value: Option<Amount>,
    },
    EnterAuction {
        account: String,
        poi_id: PoiId,
    },
    SubmitProof {
        account: String,
        poi_id: PoiId,
        proof: String,
    },
    ChallengePoi {
        account: String,
        poi_id: PoiId,
        /// Attached value; the registry's challenge deposit when absent.
        #[serde(default)]
        deposit: Option<Amount>,
    },
    /// Decided by the deployment admin.
    ResolveChallenge { poi_id: PoiId, accept: bool },
    ClaimEscrow {
        account: String,
        poi_id: PoiId,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fund { .. } => "fund",
            Self::RegisterValidator { .. } => "register_validator",
            Self::RegisterPoi { .. } => "register_poi",
            Self::EnterAuction { .. } => "enter_auction",
            Self::SubmitProof { .. } => "submit_proof",
            Self::ChallengePoi { .. } => "challenge_poi",
            Self::ResolveChallenge { .. } => "resolve_challenge",
            Self::ClaimEscrow { .. } => "claim_escrow",
        }
    }

    /// Perform the call against `d`.
    pub fn apply(&self, d: &mut Deployment) -> Result<(), NodeError> {
        match self {
            Self::Fund {
                chain,
                account,
                amount,
            } => {
                let chain = match chain {
                    ChainSide::Settlement => d.settlement.ledger.chain_id(),
                    ChainSide::Execution => d.execution.ledger.chain_id(),
                };
                d.fund(chain, resolve_account(account)?, *amount)?;
            }
            Self::RegisterValidator {
                account,
                stake,
                reputation_proof,
            } => {
                let ctx = CallContext::with_value(resolve_account(account)?, *stake);
                let exec = &mut d.execution;
                exec.validators
                    .register_validator(&mut exec.ledger, &ctx, reputation_proof.as_bytes())?;
            }
            Self::RegisterPoi {
                account,
                name,
                stake,
                value,
            } => {
                let ctx = CallContext::with_value(resolve_account(account)?, value.unwrap_or(*stake));
                let s = &mut d.settlement;
                s.registry.register_poi(&mut s.ledger, &ctx, name, *stake)?;
            }
            Self::EnterAuction { account, poi_id } => {
                let caller = resolve_account(account)?;
                let exec = &mut d.execution;
                exec.auction
                    .enter(&exec.ledger, &exec.validators, &caller, *poi_id)?;
            }
            Self::SubmitProof {
                account,
                poi_id,
                proof,
            } => {
                let caller = resolve_account(account)?;
                let exec = &mut d.execution;
                exec.auction.submit_proof(
                    &mut exec.validators,
                    &caller,
                    *poi_id,
                    proof.as_bytes().to_vec(),
                )?;
            }
            Self::ChallengePoi {
                account,
                poi_id,
                deposit,
            } => {
                let s = &mut d.settlement;
                let value = deposit.unwrap_or_else(|| s.registry.challenge_deposit());
                let ctx = CallContext::with_value(resolve_account(account)?, value);
                s.registry.challenge_poi(&mut s.ledger, &ctx, *poi_id)?;
            }
            Self::ResolveChallenge { poi_id, accept } => {
                let admin = d.admin();
                let s = &mut d.settlement;
                s.registry
                    .resolve_poi_challenge(&mut s.ledger, &admin, *poi_id, *accept)?;
            }
            Self::ClaimEscrow { account, poi_id } => {
                let caller = resolve_account(account)?;
                let s = &mut d.settlement;
                s.registry.claim_escrow(&mut s.ledger, &caller, *poi_id)?;
            }
        }
        Ok(())
    }
}

/// A `0x` address, or a label naming a derived dev account.
pub fn resolve_account(account: &str) -> Result<Address, NodeError> {
    if account.starts_with(Address::PREFIX) {
        Address::parse(account).map_err(|e| NodeError::Script(e.to_string()))
    } else if account.is_empty() {
        Err(NodeError::Script("empty account label".into()))
    } else {
        Ok(Address::derive(account))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub after_secs: u64,
    #[serde(flatten)]
    pub op: Operation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| NodeError::Script(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Script(e.to_string()))
    }
}

/// Counts from one [`ScriptRunner::run_due`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub applied: usize,
    pub failed: usize,
}

/// Feeds script steps into a deployment as ledger time reaches them.
///
/// A step the contracts refuse is logged and dropped; later steps still run.
pub struct ScriptRunner {
    steps: VecDeque<(usize, Step)>,
    started_at: Timestamp,
}

impl ScriptRunner {
    pub fn new(script: Script, started_at: Timestamp) -> Self {
        let mut steps: Vec<(usize, Step)> = script.steps.into_iter().enumerate().collect();
        // Stable, so steps sharing an offset keep file order.
        steps.sort_by_key(|(_, step)| step.after_secs);
        Self {
            steps: steps.into(),
            started_at,
        }
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step due at the deployment's current ledger time.
    pub fn run_due(&mut self, d: &mut Deployment) -> ScriptReport {
        let elapsed = self.started_at.elapsed_since(d.settlement.ledger.now());
        let mut report = ScriptReport::default();
        while let Some((_, step)) = self.steps.front() {
            if step.after_secs > elapsed {
                break;
            }
            let Some((index, step)) = self.steps.pop_front() else {
                break;
            };
            match step.op.apply(d) {
                Ok(()) => {
                    report.applied += 1;
                    tracing::info!(step = index, op = step.op.name(), "script step applied");
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(step = index, op = step.op.name(), error = %err, "script step failed");
                }
            }
        }
        report
    }
}
