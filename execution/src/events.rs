//! Events emitted by the execution-chain contracts.

use poi_types::{Address, Amount, ChainId, PoiId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionEvent {
    ValidatorRegistered {
        validator: Address,
        stake: Amount,
        reputation: u64,
    },
    AuctionOpened {
        poi_id: PoiId,
        ends_at: Timestamp,
        attempt: u32,
    },
    AuctionEntered {
        poi_id: PoiId,
        validator: Address,
    },
    AuctionAwarded {
        poi_id: PoiId,
        winner: Address,
    },
    /// The window closed with no eligible entrant. The request may be re-opened.
    AuctionFailed { poi_id: PoiId, attempt: u32 },
    /// The winner delivered its proof; relay it to the settlement chain.
    ResolutionReady {
        poi_id: PoiId,
        winner: Address,
        proof: Vec<u8>,
        destination_chain: ChainId,
        destination_contract: Option<Address>,
    },
}
