//! POI deployment harness.
//!
//! Wires the settlement and execution contracts onto two in-process ledgers
//! and relays messages between them:
//! - two-phase bootstrap of the chain bindings
//! - envelope encoding, delivery and redelivery detection
//! - settlement of auctions whose window has closed
//! - replay of timed operation scripts into a running deployment
//!
//! plus the process-level concerns shared by binaries: TOML configuration,
//! structured logging, Prometheus metrics and graceful shutdown.

pub mod config;
pub mod deployment;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod script;
pub mod shutdown;

pub use config::{NodeConfig, SelectionConfig};
pub use deployment::{DeliveryOutcome, Deployment, ExecutionChain, PumpReport, SettlementChain};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::RelayMetrics;
pub use script::{ChainSide, Operation, Script, ScriptReport, ScriptRunner, Step};
pub use shutdown::ShutdownController;
