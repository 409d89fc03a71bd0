use crate::auction::AuctionStatus;
use poi_binding::BindingError;
use poi_ledger::LedgerError;
use poi_types::{Address, ChainId, PoiId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("insufficient stake: needed {needed}, provided {provided}")]
    InsufficientStake { needed: u128, provided: u128 },

    #[error("validator {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("validator {0} is not registered")]
    NotRegistered(Address),

    #[error("validator {validator} has reputation {reputation}, auctions require {required}")]
    Ineligible {
        validator: Address,
        reputation: u64,
        required: u64,
    },

    #[error("untrusted peer {sender} on {chain}")]
    UntrustedPeer { chain: ChainId, sender: Address },

    #[error("auction for POI {poi_id} already exists ({status})")]
    AuctionExists { poi_id: PoiId, status: AuctionStatus },

    #[error("no auction for POI {0}")]
    AuctionNotFound(PoiId),

    #[error("auction for POI {0} is closed to new entrants")]
    AuctionClosed(PoiId),

    #[error("auction for POI {poi_id} cannot be settled before {ends_at}")]
    AuctionWindowOpen { poi_id: PoiId, ends_at: Timestamp },

    #[error("validator {validator} already entered the auction for POI {poi_id}")]
    AlreadyEntered { poi_id: PoiId, validator: Address },

    #[error("{caller} did not win the auction for POI {poi_id}")]
    NotWinner { poi_id: PoiId, caller: Address },

    #[error("auction for POI {poi_id} is {status}, which does not allow this operation")]
    InvalidState { poi_id: PoiId, status: AuctionStatus },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("chain binding error: {0}")]
    Binding(BindingError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<BindingError> for ExecutionError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::UntrustedPeer { chain, sender } => Self::UntrustedPeer { chain, sender },
            other => Self::Binding(other),
        }
    }
}
