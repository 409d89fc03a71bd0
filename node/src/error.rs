use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] poi_ledger::LedgerError),

    #[error("settlement error: {0}")]
    Settlement(#[from] poi_settlement::SettlementError),

    #[error("execution error: {0}")]
    Execution(#[from] poi_execution::ExecutionError),

    #[error("relay error: {0}")]
    Relay(#[from] poi_relay::RelayError),

    #[error("envelope for {0} has no route in this deployment")]
    Misrouted(poi_types::ChainId),

    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
