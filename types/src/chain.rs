//! Chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a ledger (EIP-155 style chain id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Default id of the local settlement chain in dev deployments.
    pub const DEV_SETTLEMENT: Self = Self(31337);
    /// Default id of the local execution chain in dev deployments.
    pub const DEV_EXECUTION: Self = Self(31338);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain:{}", self.0)
    }
}
