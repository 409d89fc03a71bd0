//! Balances and clock of a single chain.

use crate::clock::Clock;
use crate::context::CallContext;
use crate::error::LedgerError;
use poi_types::{Address, Amount, ChainId, Timestamp};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A chain's value ledger.
///
/// Every balance change goes through [`Ledger::transfer`] (or [`Ledger::mint`]
/// at genesis), which validates before mutating: a failed transfer leaves
/// both balances untouched.
pub struct Ledger {
    chain_id: ChainId,
    clock: Arc<dyn Clock>,
    balances: HashMap<Address, Amount>,
    /// Total value ever minted; transfers never change it.
    supply: Amount,
}

impl Ledger {
    pub fn new(chain_id: ChainId, clock: Arc<dyn Clock>) -> Self {
        Self {
            chain_id,
            clock,
            balances: HashMap::new(),
            supply: Amount::ZERO,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Current consensus time of this chain.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Credit freshly created value to `account` (genesis allocations and faucets).
    pub fn mint(&mut self, account: Address, amount: Amount) -> Result<(), LedgerError> {
        let supply = self
            .supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance_of(&account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.supply = supply;
        self.balances.insert(account, balance);
        tracing::debug!(chain = %self.chain_id, account = %account, %amount, "minted");
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.ensure_funds(&from, amount)?;
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let from_balance = self.balance_of(&from) - amount;
        let to_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        tracing::trace!(chain = %self.chain_id, %from, %to, %amount, "transfer");
        Ok(())
    }

    /// Pull the value attached to a payable call into `contract`.
    pub fn collect(&mut self, ctx: &CallContext, contract: Address) -> Result<(), LedgerError> {
        self.transfer(ctx.caller, contract, ctx.value)
    }

    /// Fail with [`LedgerError::InsufficientFunds`] unless `account` holds at least `amount`.
    pub fn ensure_funds(&self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *account,
                needed: amount.raw(),
                available: available.raw(),
            });
        }
        Ok(())
    }

    pub fn summary(&self) -> LedgerSummary {
        let circulating = self
            .balances
            .values()
            .fold(Amount::ZERO, |acc, b| acc.checked_add(*b).unwrap_or(acc));
        LedgerSummary {
            chain_id: self.chain_id,
            accounts: self.balances.len(),
            supply: self.supply,
            circulating,
        }
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("chain_id", &self.chain_id)
            .field("accounts", &self.balances.len())
            .field("supply", &self.supply)
            .finish()
    }
}

/// Summary statistics for a ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSummary {
    pub chain_id: ChainId,
    pub accounts: usize,
    /// Total value minted.
    pub supply: Amount,
    /// Sum of all balances. Equal to `supply` unless value was lost.
    pub circulating: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;

    fn ledger() -> Ledger {
        Ledger::new(ChainId::DEV_SETTLEMENT, Arc::new(SystemClock))
    }

    #[test]
    fn transfer_moves_value() {
        let mut l = ledger();
        let a = Address::derive("a");
        let b = Address::derive("b");
        l.mint(a, Amount::from_units(2)).unwrap();
        l.transfer(a, b, Amount::from_milli(500)).unwrap();
        assert_eq!(l.balance_of(&a), Amount::from_milli(1500));
        assert_eq!(l.balance_of(&b), Amount::from_milli(500));
        let summary = l.summary();
        assert_eq!(summary.supply, summary.circulating);
    }

    #[test]
    fn overdraft_is_rejected_without_side_effects() {
        let mut l = ledger();
        let a = Address::derive("a");
        let b = Address::derive("b");
        l.mint(a, Amount::from_units(1)).unwrap();
        let err = l.transfer(a, b, Amount::from_units(2)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(l.balance_of(&a), Amount::from_units(1));
        assert_eq!(l.balance_of(&b), Amount::ZERO);
    }

    #[test]
    fn collect_pulls_attached_value() {
        let mut l = ledger();
        let user = Address::derive("user");
        let contract = Address::derive("contract");
        l.mint(user, Amount::from_units(1)).unwrap();
        l.collect(&CallContext::with_value(user, Amount::from_milli(100)), contract)
            .unwrap();
        assert_eq!(l.balance_of(&contract), Amount::from_milli(100));
    }

    #[test]
    fn zero_transfer_is_a_noop() {
        let mut l = ledger();
        let a = Address::derive("a");
        l.transfer(a, Address::derive("b"), Amount::ZERO).unwrap();
        assert_eq!(l.summary().accounts, 0);
    }
}
