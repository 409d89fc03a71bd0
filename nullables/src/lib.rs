//! Nullable infrastructure for deterministic testing.
//!
//! The ledger clock and the admin capability are abstracted behind traits in
//! `poi-ledger`. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never read the system clock
//!
//! Usage: swap real implementations for nullables in tests.

pub mod access;
pub mod clock;

pub use access::NullAccess;
pub use clock::NullClock;
