//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use std::time::Duration;
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Keystore decryption or signer error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Contract creation could not be built or submitted.
    #[error("Deployment error: {0}")]
    Deployment(String),

    /// Contract call failed.
    #[error("Contract call error: {0}")]
    Call(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// The parts of a transaction receipt the test flow inspects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiptSummary {
    /// Block the transaction was included in; `None` while pending.
    pub block_number: Option<u64>,
    /// Execution status (`true` = success).
    pub status: bool,
    /// Address of the created contract, for creation transactions.
    pub contract_address: Option<Address>,
    pub gas_used: u64,
}

impl ReceiptSummary {
    /// A successful receipt mined in `block_number`.
    pub fn mined(block_number: u64) -> Self {
        Self {
            block_number: Some(block_number),
            status: true,
            ..Default::default()
        }
    }
}

/// A transaction observed in a mined block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Number of receipt lookups performed, including the successful one.
    pub attempts: u32,
    /// Whether the transaction executed successfully.
    pub succeeded: bool,
    pub gas_used: u64,
}

/// Invalid confirmation policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("confirmation policy needs at least one attempt")]
    ZeroAttempts,
}

/// Terminal outcomes of waiting for a transaction that did not confirm.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// No mined receipt was observed within the attempt budget.
    #[error(
        "Transaction with hash '{tx_hash}' wasn't mined even after checking {max_attempts} times with {interval:?} between checks"
    )]
    TimedOut {
        tx_hash: TxHash,
        max_attempts: u32,
        interval: Duration,
        /// Most recent lookup failure, if any attempt errored.
        last_error: Option<String>,
    },

    /// The caller's shutdown signal fired before confirmation.
    #[error("Waiting for transaction '{tx_hash}' was cancelled after {attempts} checks")]
    Cancelled { tx_hash: TxHash, attempts: u32 },
}

impl ConfirmationError {
    /// The transaction this error refers to.
    pub fn tx_hash(&self) -> TxHash {
        match self {
            Self::TimedOut { tx_hash, .. } | Self::Cancelled { tx_hash, .. } => *tx_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(15u64);
        assert_eq!(chain_id.0, 15);
        assert_eq!(u64::from(chain_id), 15);
    }

    #[test]
    fn test_default_config() {
        let config = BlockchainConfig::default();
        assert_eq!(config.rpc_port, 8545);
        assert_eq!(config.chain_id, 15);
        assert_eq!(config.gas_price_wei, 5);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = ConfirmationError::TimedOut {
            tx_hash: TxHash::ZERO,
            max_attempts: 10,
            interval: Duration::from_secs(1),
            last_error: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 times"));
        assert!(msg.contains("1s"));
    }

    #[test]
    fn test_mined_receipt() {
        let receipt = ReceiptSummary::mined(42);
        assert_eq!(receipt.block_number, Some(42));
        assert!(receipt.status);
        assert!(receipt.contract_address.is_none());
    }
}
