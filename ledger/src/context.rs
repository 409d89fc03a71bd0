//! Call context and message origin.

use poi_types::{Address, Amount, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A local call: the calling account and the value attached to the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub value: Amount,
}

impl CallContext {
    /// A call with no value attached.
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: Amount::ZERO,
        }
    }

    /// A payable call.
    pub fn with_value(caller: Address, value: Amount) -> Self {
        Self { caller, value }
    }
}

/// Where an authorised call came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Submitted directly on this chain by `account`.
    Account(Address),
    /// Delivered by the relay on behalf of `sender`, a contract on `chain`.
    Remote { chain: ChainId, sender: Address },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(addr) => write!(f, "{addr}"),
            Self::Remote { chain, sender } => write!(f, "{sender}@{chain}"),
        }
    }
}
