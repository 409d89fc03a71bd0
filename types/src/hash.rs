//! Digest of an opaque verification proof.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// Blake2b-256 digest of a proof blob.
///
/// The proof itself is opaque to the protocol; the digest only gives logs,
/// events and audits a fixed-size handle on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofDigest([u8; 32]);

impl ProofDigest {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a proof blob.
    pub fn of(proof: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(proof);
        let mut output = [0u8; 32];
        output.copy_from_slice(&hasher.finalize());
        Self(output)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for ProofDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofDigest({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ProofDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
