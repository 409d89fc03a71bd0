use poi_types::{Address, ChainId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("{0} is not authorised to change the chain binding")]
    Unauthorized(Address),

    #[error("binding is already bound to peer {0}")]
    AlreadyBound(Address),

    #[error("cannot bind to the null address")]
    NullPeer,

    #[error("untrusted peer {sender} on {chain}")]
    UntrustedPeer { chain: ChainId, sender: Address },
}
