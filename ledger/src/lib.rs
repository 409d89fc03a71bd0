//! Per-chain value ledger.
//!
//! Each chain in the protocol is modelled as a [`Ledger`]: an account →
//! balance map plus the chain's own clock. Contracts hold their escrow as an
//! ordinary balance under their contract address and move value only through
//! [`Ledger::transfer`], which is checked and all-or-nothing.
//!
//! The crate also defines the pieces every contract call needs:
//! - [`CallContext`]: who is calling and how much value they attached
//! - [`Origin`]: whether a call comes from a local account or across the bridge
//! - [`AccessControl`]: the injected admin capability

pub mod access;
pub mod clock;
pub mod context;
pub mod error;
pub mod ledger;

pub use access::{AccessControl, OwnerAccess};
pub use clock::{Clock, SystemClock};
pub use context::{CallContext, Origin};
pub use error::LedgerError;
pub use ledger::{Ledger, LedgerSummary};
