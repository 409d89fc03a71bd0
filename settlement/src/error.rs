use crate::poi::PoiStatus;
use poi_binding::BindingError;
use poi_ledger::LedgerError;
use poi_types::{Address, ChainId, PoiId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("POI name must not be empty")]
    EmptyName,

    #[error("insufficient stake: needed {needed}, provided {provided}")]
    InsufficientStake { needed: u128, provided: u128 },

    #[error("{0} is not authorised for this operation")]
    Unauthorized(Address),

    #[error("POI {poi_id} is {status}, which does not allow this operation")]
    InvalidState { poi_id: PoiId, status: PoiStatus },

    #[error("challenge on POI {poi_id} cannot be resolved before {ends_at}")]
    ChallengeWindowOpen { poi_id: PoiId, ends_at: Timestamp },

    #[error("untrusted peer {sender} on {chain}")]
    UntrustedPeer { chain: ChainId, sender: Address },

    #[error("POI {0} not found")]
    NotFound(PoiId),

    #[error("nothing to claim for POI {0}")]
    NothingToClaim(PoiId),

    #[error("arithmetic overflow in escrow computation")]
    Overflow,

    #[error("chain binding error: {0}")]
    Binding(BindingError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<BindingError> for SettlementError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::UntrustedPeer { chain, sender } => Self::UntrustedPeer { chain, sender },
            BindingError::Unauthorized(caller) => Self::Unauthorized(caller),
            other => Self::Binding(other),
        }
    }
}
