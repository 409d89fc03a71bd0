//! Events emitted by the POI registry for the relay and for audit.

use poi_types::{Address, Amount, ChainId, PoiId, ProofDigest, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// A POI was registered and needs a validator on the execution chain.
    ///
    /// `destination_contract` is `None` if the registry was still unbound.
    VerificationRequested {
        poi_id: PoiId,
        owner: Address,
        name: String,
        stake_amount: Amount,
        destination_chain: ChainId,
        destination_contract: Option<Address>,
    },
    /// A validator's proof was accepted and the validator paid.
    PoiResolved {
        poi_id: PoiId,
        validator: Address,
        reward: Amount,
        proof_digest: ProofDigest,
    },
    /// A verified POI was disputed.
    PoiChallenged {
        poi_id: PoiId,
        challenger: Address,
        deposit: Amount,
        ends_at: Timestamp,
    },
    /// The challenge was dismissed and the POI is Verified again.
    ChallengeDismissed {
        poi_id: PoiId,
        deposit: Amount,
        deposit_paid_to: Address,
    },
    /// The challenge was upheld; the owner was refunded and the challenger's deposit returned.
    PoiRejected {
        poi_id: PoiId,
        owner: Address,
        refund: Amount,
        challenger: Address,
        deposit_returned: Amount,
    },
    /// The owner withdrew unreserved escrow.
    EscrowClaimed {
        poi_id: PoiId,
        owner: Address,
        amount: Amount,
    },
    /// The registry was bound to its execution-chain peer.
    PeerBound { chain: ChainId, peer: Address },
}
