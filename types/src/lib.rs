//! Fundamental types for the POI protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, value amounts, ledger timestamps, chain identifiers,
//! proof digests, and the protocol parameters both chains are deployed with.

pub mod address;
pub mod amount;
pub mod chain;
pub mod error;
pub mod hash;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use chain::ChainId;
pub use error::TypesError;
pub use hash::ProofDigest;
pub use params::{ChallengeDepositPolicy, ProtocolParams};
pub use time::Timestamp;

/// Identifier of a POI record on the settlement chain. The first POI is `1`.
pub type PoiId = u64;
