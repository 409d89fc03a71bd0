//! Chain binding.
//!
//! Each POI contract records the chain id and contract address of its peer on
//! the other chain, and rejects every cross-chain call that does not come
//! from exactly that pair.
//!
//! Deployment is two-phase: the first contract is deployed before its peer
//! exists, so its binding starts [`BindingState::Unbound`] and refuses all
//! inbound messages until the admin binds it once with [`ChainBinding::rebind`].

pub mod binding;
pub mod error;

pub use binding::{BindingState, ChainBinding};
pub use error::BindingError;
