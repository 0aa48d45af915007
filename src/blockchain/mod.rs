//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Static files (keystore, password)
//!     → wallet.rs (keystore decryption)
//!     → client.rs (RPC connection with timeouts)
//!     → transaction.rs (deploy contract, call greet)
//!     → confirmation.rs (poll receipt until mined)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or passwords
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod confirmation;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use confirmation::{
    wait_for_confirmation, wait_for_confirmation_until, ConfirmationPolicy, ReceiptLookup,
};
pub use transaction::{ContractDeployer, PendingDeployment};
pub use types::{
    BlockchainConfig, BlockchainError, ChainId, Confirmation, ConfirmationError, PolicyError,
    ReceiptSummary,
};
pub use wallet::Wallet;
