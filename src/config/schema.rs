//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the test
//! harness. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::blockchain::confirmation::ConfirmationPolicy;
use crate::blockchain::types::PolicyError;

/// Root configuration for the test harness.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TestsuiteConfig {
    /// Setup and run deadlines.
    pub test: TestTimeoutConfig,

    /// Which orchestration lambda provisions the network.
    pub lambda: LambdaConfig,

    /// Services and static files known to the local network.
    pub network: NetworkConfig,

    /// Chain endpoint and signing parameters.
    pub blockchain: BlockchainConfig,

    /// Receipt polling policy.
    pub confirmation: ConfirmationConfig,

    /// Contract deployed by the advanced test.
    pub contract: ContractConfig,

    /// Account listing check.
    pub accounts: AccountsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Setup and run deadlines for a test.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TestTimeoutConfig {
    pub setup_timeout_secs: u64,
    pub run_timeout_secs: u64,
}

impl Default for TestTimeoutConfig {
    fn default() -> Self {
        Self {
            setup_timeout_secs: 240,
            run_timeout_secs: 240,
        }
    }
}

/// Orchestration lambda configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LambdaConfig {
    /// Identifier the lambda is registered under.
    pub id: String,

    /// Container image implementing the lambda.
    pub image: String,

    /// JSON parameters passed when loading the lambda.
    pub params: String,

    /// File holding the JSON result the local lambda returns on execute.
    pub result_path: Option<PathBuf>,
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            id: "eth-lambda".to_string(),
            image: "kurtosistech/ethereum-kurtosis-lambda".to_string(),
            params: "{}".to_string(),
            result_path: None,
        }
    }
}

/// Services and static files resolvable through the local network.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NetworkConfig {
    /// Service ID → IP address.
    pub services: HashMap<String, String>,

    /// Static file ID → path on disk.
    pub static_files: HashMap<String, PathBuf>,
}

/// Blockchain endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC port exposed by every node.
    pub rpc_port: u16,

    /// Chain ID used for EIP-155 signing (15 for the lambda's private network).
    pub chain_id: u64,

    /// Fixed legacy gas price in wei.
    pub gas_price_wei: u128,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_port: 8545,
            chain_id: 15,
            gas_price_wei: 5,
            rpc_timeout_secs: 10,
        }
    }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl ConfirmationConfig {
    /// Build the polling policy described by this section.
    pub fn policy(&self) -> Result<ConfirmationPolicy, PolicyError> {
        ConfirmationPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms))
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval_ms: 1000,
        }
    }
}

/// Contract deployment configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Hex-encoded creation bytecode of the greeter contract.
    pub bytecode_path: Option<PathBuf>,
}

/// Account listing check run inside the bootnode service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub list_command: Vec<String>,
    pub expected_exit_code: i32,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            list_command: vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "geth attach data/geth.ipc --exec eth.accounts".to_string(),
            ],
            expected_exit_code: 0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level for this crate (overridden by `RUST_LOG`).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
