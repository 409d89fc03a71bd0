//! Ledger clock.

use poi_types::Timestamp;

/// The consensus clock of a ledger.
///
/// Contracts read time only through this trait. Deterministic implementations
/// live in `poi-nullables`.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time, for the daemon's long-running deployment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
