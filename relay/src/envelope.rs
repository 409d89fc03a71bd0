//! Wire format for cross-chain messages.

use crate::error::RelayError;
use poi_types::{Address, Amount, ChainId, PoiId};
use serde::{Deserialize, Serialize};

/// Version written into every envelope; decoding any other version fails.
pub const PROTOCOL_VERSION: u16 = 1;

/// Payload of a cross-chain message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Settlement → execution: a POI was registered and needs a validator.
    VerificationRequest {
        poi_id: PoiId,
        name: String,
        owner: Address,
        stake_amount: Amount,
    },
    /// Execution → settlement: the auction winner delivered its proof.
    Resolution {
        poi_id: PoiId,
        validator: Address,
        proof: Vec<u8>,
    },
}

impl Message {
    pub fn poi_id(&self) -> PoiId {
        match self {
            Self::VerificationRequest { poi_id, .. } | Self::Resolution { poi_id, .. } => *poi_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::VerificationRequest { .. } => "verification_request",
            Self::Resolution { .. } => "resolution",
        }
    }
}

/// A message in flight between chains.
///
/// `source_chain` and `source_contract` become the receiving contract's
/// remote origin, which its chain binding checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u16,
    pub source_chain: ChainId,
    pub source_contract: Address,
    pub destination_chain: ChainId,
    /// Monotonic per source chain.
    pub nonce: u64,
    pub message: Message,
}

impl Envelope {
    pub fn encode(&self) -> Result<Vec<u8>, RelayError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RelayError> {
        let envelope: Envelope = bincode::deserialize(bytes)?;
        if envelope.version != PROTOCOL_VERSION {
            return Err(RelayError::Version {
                found: envelope.version,
                expected: PROTOCOL_VERSION,
            });
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution() -> Envelope {
        Envelope {
            version: PROTOCOL_VERSION,
            source_chain: ChainId::DEV_EXECUTION,
            source_contract: Address::derive("auction"),
            destination_chain: ChainId::DEV_SETTLEMENT,
            nonce: 7,
            message: Message::Resolution {
                poi_id: 3,
                validator: Address::derive("v"),
                proof: b"proof".to_vec(),
            },
        }
    }

    #[test]
    fn decode_restores_envelope() {
        let env = resolution();
        let bytes = env.encode().unwrap();
        assert_eq!(Envelope::decode(&bytes).unwrap(), env);
    }

    #[test]
    fn truncated_bytes_are_a_codec_error() {
        let bytes = resolution().encode().unwrap();
        let err = Envelope::decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, RelayError::Codec(_)));
    }

    #[test]
    fn foreign_version_is_refused() {
        let mut env = resolution();
        env.version = 9;
        let bytes = env.encode().unwrap();
        assert!(matches!(
            Envelope::decode(&bytes),
            Err(RelayError::Version { found: 9, expected: 1 })
        ));
    }

    #[test]
    fn message_accessors() {
        let env = resolution();
        assert_eq!(env.message.poi_id(), 3);
        assert_eq!(env.message.kind(), "resolution");
    }
}
