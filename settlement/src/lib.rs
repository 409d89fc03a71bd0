//! Settlement-chain side of the POI protocol.
//!
//! The [`PoiRegistry`] owns every POI record and its escrowed stake, and
//! drives the lifecycle:
//!
//! ```text
//! register ──► Verifying ──resolve──► Verified ◄──dismiss── Challenged
//!                                        │                     ▲
//!                                        └──────challenge──────┘
//!                                                    Challenged ──uphold──► Rejected
//! ```
//!
//! Verification requests leave through the event queue toward the execution
//! chain; results come back through [`PoiRegistry::resolve_poi`], accepted
//! only from the admin or from the peer recorded in the chain binding.
//! The dispute sub-flow (windows and deposits) lives in [`ChallengeManager`].

pub mod challenge;
pub mod error;
pub mod events;
pub mod poi;
pub mod registry;

pub use challenge::{ChallengeManager, ChallengeVerdict};
pub use error::SettlementError;
pub use events::SettlementEvent;
pub use poi::{Challenge, Poi, PoiState, PoiStatus, Resolution};
pub use registry::PoiRegistry;
