//! Cross-chain relay plumbing for the POI protocol.
//!
//! The relay carries two kinds of message: verification requests from the
//! settlement chain to the execution chain, and resolutions back. Delivery is
//! at-least-once; [`Inbox`] flags redeliveries so they can be dropped early,
//! though the contracts stay idempotent on their own.

pub mod envelope;
pub mod error;
pub mod inbox;
pub mod outbox;

pub use envelope::{Envelope, Message, PROTOCOL_VERSION};
pub use error::RelayError;
pub use inbox::{Delivery, Inbox, DEFAULT_INBOX_CAPACITY};
pub use outbox::Outbox;
