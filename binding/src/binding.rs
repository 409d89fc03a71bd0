use crate::error::BindingError;
use poi_ledger::{AccessControl, Origin};
use poi_types::{Address, ChainId};
use serde::{Deserialize, Serialize};

/// Whether the peer contract is known yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingState {
    /// Deployed with a placeholder peer; every inbound message is refused.
    Unbound,
    /// Bound to the peer contract; only it may send inbound messages.
    Bound { peer: Address },
}

/// The `(local chain, remote chain, remote contract)` trust record of one contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBinding {
    local_chain: ChainId,
    remote_chain: ChainId,
    state: BindingState,
}

impl ChainBinding {
    /// Create a binding. A null `peer` (the placeholder used when the peer is
    /// not deployed yet) produces an unbound binding.
    pub fn new(local_chain: ChainId, remote_chain: ChainId, peer: Address) -> Self {
        let state = if peer.is_null() {
            BindingState::Unbound
        } else {
            BindingState::Bound { peer }
        };
        Self {
            local_chain,
            remote_chain,
            state,
        }
    }

    pub fn unbound(local_chain: ChainId, remote_chain: ChainId) -> Self {
        Self::new(local_chain, remote_chain, Address::NULL)
    }

    pub fn local_chain(&self) -> ChainId {
        self.local_chain
    }

    pub fn remote_chain(&self) -> ChainId {
        self.remote_chain
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound { .. })
    }

    /// The trusted peer contract, or `None` while unbound.
    pub fn peer(&self) -> Option<Address> {
        match self.state {
            BindingState::Bound { peer } => Some(peer),
            BindingState::Unbound => None,
        }
    }

    /// Bind the peer contract. Admin-only, and allowed exactly once.
    pub fn rebind(
        &mut self,
        access: &dyn AccessControl,
        caller: &Address,
        peer: Address,
    ) -> Result<(), BindingError> {
        if !access.is_admin(caller) {
            return Err(BindingError::Unauthorized(*caller));
        }
        if let BindingState::Bound { peer: existing } = self.state {
            return Err(BindingError::AlreadyBound(existing));
        }
        if peer.is_null() {
            return Err(BindingError::NullPeer);
        }
        self.state = BindingState::Bound { peer };
        tracing::info!(
            local = %self.local_chain,
            remote = %self.remote_chain,
            %peer,
            "chain binding bound"
        );
        Ok(())
    }

    /// Accept a cross-chain call only if it comes from the bound peer on the remote chain.
    pub fn authorize(&self, chain: ChainId, sender: &Address) -> Result<(), BindingError> {
        match self.state {
            BindingState::Bound { peer } if chain == self.remote_chain && *sender == peer => Ok(()),
            _ => {
                tracing::debug!(%chain, %sender, state = ?self.state, "rejected untrusted peer");
                Err(BindingError::UntrustedPeer {
                    chain,
                    sender: *sender,
                })
            }
        }
    }

    /// Like [`ChainBinding::authorize`], for an origin that must be remote.
    ///
    /// A local account origin is never a trusted peer, even if its address
    /// happens to equal the peer contract's.
    pub fn authorize_origin(&self, origin: &Origin) -> Result<(), BindingError> {
        match origin {
            Origin::Remote { chain, sender } => self.authorize(*chain, sender),
            Origin::Account(addr) => Err(BindingError::UntrustedPeer {
                chain: self.local_chain,
                sender: *addr,
            }),
        }
    }
}
