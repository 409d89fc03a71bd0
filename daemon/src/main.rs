//! POI daemon: runs the reference scenario, the relay loop, or prints config.

mod scenario;

use anyhow::Context;
use clap::Parser;
use poi_ledger::SystemClock;
use poi_node::{init_logging, Deployment, LogFormat, NodeConfig, Script, ScriptRunner, ShutdownController};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "poi-daemon", about = "Cross-chain POI verification daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "POI_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "POI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "POI_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run register → auction → resolve → challenge → verdict and print the balances.
    Scenario {
        /// Dismiss the challenge instead of upholding it.
        #[arg(long)]
        accept: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Pump the relay and settle due auctions until interrupted, feeding in
    /// the steps of an operation script as they fall due.
    Relay {
        /// Loop period in milliseconds (defaults to the config value).
        #[arg(long, env = "POI_RELAY_INTERVAL_MS")]
        interval_ms: Option<u64>,

        /// TOML file of `[[step]]` operations to replay.
        #[arg(long, env = "POI_SCRIPT")]
        script: Option<PathBuf>,

        /// Print Prometheus metrics on exit.
        #[arg(long)]
        metrics: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Command::Relay {
        interval_ms: Some(ms),
        ..
    } = cli.command
    {
        config.relay_interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

async fn run_relay(
    config: NodeConfig,
    script: Option<PathBuf>,
    print_metrics: bool,
) -> anyhow::Result<()> {
    let mut deployment = Deployment::bootstrap(&config, Arc::new(SystemClock))?;
    let script = match &script {
        Some(path) => Script::from_toml_file(path)?,
        None => Script::default(),
    };
    let mut runner = ScriptRunner::new(script, deployment.settlement.ledger.now());
    let shutdown = Arc::new(ShutdownController::new());
    let mut stop = shutdown.subscribe();
    let signals = shutdown.clone().spawn_signal_listener();

    let mut ticker = tokio::time::interval(Duration::from_millis(config.relay_interval_ms));
    tracing::info!(
        interval_ms = config.relay_interval_ms,
        script_steps = runner.remaining(),
        "relay loop started"
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let settled = deployment.settle_due()?;
                let steps = runner.run_due(&mut deployment);
                let report = deployment.pump()?;
                if !settled.is_empty() || !report.is_idle() || steps.applied + steps.failed > 0 {
                    tracing::info!(
                        settled = settled.len(),
                        steps_applied = steps.applied,
                        steps_failed = steps.failed,
                        sent = report.sent,
                        applied = report.applied,
                        duplicates = report.duplicates,
                        rejected = report.rejected,
                        "relay tick"
                    );
                }
            }
            _ = stop.recv() => break,
        }
    }
    signals.abort();

    if print_metrics {
        print!("{}", deployment.metrics().encode()?);
    }
    tracing::info!("relay stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(format, &config.log_level);

    match cli.command {
        Command::Scenario { accept, json } => {
            let report = scenario::run(&config, accept)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Command::Relay {
            script, metrics, ..
        } => run_relay(config, script, metrics).await?,
        Command::Config => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
