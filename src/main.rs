//! re[wan]sh: WAN uplink failover daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                             REWANSH                              │
//!   │                                                                  │
//!   │  ┌───────────┐   Up/Down   ┌──────────┐  Down/Up/Stable          │
//!   │  │ heartbeat │────────────▶│  link 1  │───────────┐              │
//!   │  │ (ws ping) │             │  state   │           │              │
//!   │  └───────────┘             └──────────┘           ▼              │
//!   │  ┌───────────┐             ┌──────────┐    ┌──────────────┐      │
//!   │  │ heartbeat │────────────▶│  link 2  │───▶│   failover   │──────┼──▶ activation
//!   │  └───────────┘             └──────────┘    │   manager    │      │    command
//!   │  ┌───────────┐             ┌──────────┐    │ (one loop)   │      │
//!   │  │ heartbeat │────────────▶│  link N  │───▶│              │      │
//!   │  └───────────┘             └──────────┘    └──────────────┘      │
//!   │                                                                  │
//!   │   config · lifecycle (signals, shutdown) · observability         │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rewansh::config::load_config;
use rewansh::failover::{CommandActivator, FailoverManager};
use rewansh::lifecycle::{shutdown_signal, Shutdown, SHUTDOWN_GRACE};
use rewansh::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rewansh")]
#[command(about = "Keeps a host online by failing over between WAN uplinks", long_about = None)]
struct Cli {
    /// TOML configuration path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Unable to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level, cli.verbose);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let manager = match FailoverManager::new(&config, CommandActivator) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Unable to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        config = %cli.config.display(),
        links = config.links.len(),
        min_uptime_secs = config.min_uptime.0,
        "Starting re[wan]sh..."
    );

    let shutdown = Shutdown::new();
    let mut manager_task = tokio::spawn(manager.run(shutdown.token()));

    let exited_early = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut manager_task => Some(result),
    };
    if let Some(result) = exited_early {
        if let Err(e) = result {
            tracing::error!(error = %e, "Failover manager exited unexpectedly");
        }
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutting down re[wan]sh...");
    shutdown.trigger();
    shutdown.drain(manager_task, SHUTDOWN_GRACE).await;
    tracing::info!("Bye.");

    ExitCode::SUCCESS
}
