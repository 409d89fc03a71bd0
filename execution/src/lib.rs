//! Execution-chain side of the POI protocol.
//!
//! Two contracts share one deployment address:
//! 1. **Validator registry**: validators stake value to register and receive a
//!    reputation score from a pluggable [`ReputationAssessor`].
//! 2. **Verification auction**: each verification request relayed from the
//!    settlement chain opens a timed auction. Eligible validators enter while
//!    the window is open; once it closes a [`SelectionPolicy`] picks the
//!    winner, who later submits the proof that is relayed back for settlement.

pub mod auction;
pub mod error;
pub mod events;
pub mod reputation;
pub mod selection;
pub mod validators;

pub use auction::{Auction, AuctionState, AuctionStatus, VerificationAuction, VerificationRequest};
pub use error::ExecutionError;
pub use events::ExecutionEvent;
pub use reputation::{PresenceAssessor, ReputationAssessor};
pub use selection::{ReputationStakeAge, SeededPolicy, SelectionPolicy};
pub use validators::{Validator, ValidatorRegistry};
