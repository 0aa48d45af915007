//! Ethereum end-to-end test harness.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ config ──▶ TestRunner ──▶ AdvancedTest
//!                                                │
//!            ┌───────────────────────────────────┼──────────────────────┐
//!            ▼                                   ▼                      ▼
//!     orchestration                        blockchain               lifecycle
//!  lambda / services /             client / wallet / deploy /     signals →
//!  static files / exec              confirmation polling          shutdown
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::TxHash;
use eth_testsuite::blockchain::{wait_for_confirmation_until, BlockchainClient};
use eth_testsuite::config::{load_config, TestsuiteConfig};
use eth_testsuite::lifecycle::signals::spawn_signal_handler;
use eth_testsuite::lifecycle::Shutdown;
use eth_testsuite::observability::{logging, metrics};
use eth_testsuite::orchestration::{LocalNetwork, NetworkContext};
use eth_testsuite::testsuite::{AdvancedTest, TestRunner};

#[derive(Parser)]
#[command(name = "eth-testsuite")]
#[command(about = "End-to-end tests for lambda-provisioned Ethereum networks", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the deploy-and-confirm test
    Run,
    /// Wait for a transaction to be mined
    Wait {
        /// JSON-RPC endpoint of the node to poll
        #[arg(long)]
        rpc_url: url::Url,
        /// Hash of the transaction to wait for
        tx_hash: TxHash,
        /// Override `confirmation.max_attempts`
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Override `confirmation.interval_ms`
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Validate the configuration and print the effective settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TestsuiteConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("eth-testsuite v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_handler(shutdown.clone());

    match cli.command {
        Commands::Run => {
            let network: Arc<dyn NetworkContext> =
                Arc::new(LocalNetwork::from_config(&config.network, &config.lambda));
            let test = AdvancedTest::new(config.clone());
            let mut runner = TestRunner::new(&shutdown);

            match runner.execute(&test, network).await {
                Ok(report) => {
                    println!(
                        "PASSED {} (setup {:?}, run {:?})",
                        report.name, report.setup_elapsed, report.run_elapsed
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Test failed");
                    return Err(e.into());
                }
            }
        }
        Commands::Wait {
            rpc_url,
            tx_hash,
            max_attempts,
            interval_ms,
        } => {
            let mut confirmation = config.confirmation.clone();
            if let Some(max_attempts) = max_attempts {
                confirmation.max_attempts = max_attempts;
            }
            if let Some(interval_ms) = interval_ms {
                confirmation.interval_ms = interval_ms;
            }
            let policy = confirmation.policy()?;

            let client = BlockchainClient::from_url(rpc_url, config.blockchain.clone());
            let confirmed =
                wait_for_confirmation_until(&client, tx_hash, &policy, shutdown.subscribe())
                    .await?;

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "tx_hash": tx_hash.to_string(),
                    "block_number": confirmed.block_number,
                    "attempts": confirmed.attempts,
                    "succeeded": confirmed.succeeded,
                }))?
            );
        }
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
