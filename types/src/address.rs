//! Account and contract address type with `0x` hex rendering.

use crate::error::TypesError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte ledger address identifying an externally owned account or a contract.
///
/// Rendered as `0x` followed by 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The standard prefix for rendered addresses.
    pub const PREFIX: &'static str = "0x";

    /// The all-zero placeholder address, used for a peer that is not yet deployed.
    pub const NULL: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Used for dev deployments and tests: the address is the first 20 bytes of
    /// `Blake2b-256(label)`.
    pub fn derive(label: &str) -> Self {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    /// Parse a `0x`-prefixed hex address.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let hex_part = raw
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypesError::InvalidAddress(format!("{raw}: missing 0x prefix")))?;
        let decoded =
            hex::decode(hex_part).map_err(|e| TypesError::InvalidAddress(format!("{raw}: {e}")))?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| TypesError::InvalidAddress(format!("{raw}: expected 20 bytes")))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the placeholder [`Address::NULL`].
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}{})", Self::PREFIX, hex::encode(&self.0[..4]))
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}
