//! Contract deployment and calls.
//!
//! # Responsibilities
//! - Sign and broadcast a contract creation transaction
//! - Predict the created contract's address from sender and nonce
//! - Read the greeter contract's `greet()` against the pending block
//!
//! Confirmation of the broadcast transaction is left to
//! [`crate::blockchain::confirmation`].

use alloy::eips::BlockId;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use std::time::Duration;

use crate::blockchain::client::bounded;
use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

sol! {
    /// Minimal greeter contract deployed by the advanced test.
    #[sol(rpc)]
    contract HelloWorld {
        function greet() external view returns (string memory);
    }
}

/// Parse hex-encoded creation bytecode (with or without `0x`).
pub fn parse_bytecode(hex: &str) -> BlockchainResult<Bytes> {
    let bytecode: Bytes = hex
        .trim()
        .parse()
        .map_err(|e| BlockchainError::Deployment(format!("Invalid contract bytecode: {}", e)))?;

    if bytecode.is_empty() {
        return Err(BlockchainError::Deployment("Contract bytecode is empty".to_string()));
    }
    Ok(bytecode)
}

/// A node rejecting the creation is a deployment failure; timeouts stay timeouts.
fn rejected_deployment(err: BlockchainError) -> BlockchainError {
    match err {
        BlockchainError::Rpc(message) => BlockchainError::Deployment(message),
        other => other,
    }
}

/// A contract creation that has been broadcast but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeployment {
    /// Address the contract will live at once mined.
    pub address: Address,
    /// Hash of the creation transaction.
    pub tx_hash: TxHash,
}

/// Signs and submits transactions for one wallet.
pub struct ContractDeployer {
    provider: DynProvider,
    wallet: Wallet,
    config: BlockchainConfig,
    timeout_duration: Duration,
}

impl ContractDeployer {
    /// Create a deployer signing with `wallet` against the node at `url`.
    pub fn new(url: url::Url, wallet: Wallet, config: BlockchainConfig) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased();

        Self {
            provider,
            wallet,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        }
    }

    /// Build the creation transaction for `bytecode` at `nonce`.
    pub fn creation_request(&self, bytecode: Bytes, nonce: u64) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_nonce(nonce)
            .with_chain_id(self.config.chain_id)
            .with_gas_price(self.config.gas_price_wei)
            .with_deploy_code(bytecode)
    }

    /// Sign and broadcast a contract creation.
    ///
    /// Returns as soon as the node accepts the transaction.
    pub async fn deploy(&self, bytecode: Bytes) -> BlockchainResult<PendingDeployment> {
        let from = self.wallet.address();
        let nonce = bounded(
            self.timeout_duration,
            "eth_getTransactionCount",
            self.provider.get_transaction_count(from).pending(),
        )
        .await?;

        let tx = self.creation_request(bytecode, nonce);
        let pending = bounded(
            self.timeout_duration,
            "eth_sendRawTransaction",
            self.provider.send_transaction(tx),
        )
        .await
        .map_err(rejected_deployment)?;

        let deployment = PendingDeployment {
            address: from.create(nonce),
            tx_hash: *pending.tx_hash(),
        };

        tracing::info!(
            contract = %deployment.address,
            tx_hash = %deployment.tx_hash,
            nonce = nonce,
            "Contract pending deploy"
        );

        Ok(deployment)
    }

    /// Call `greet()` on a deployed greeter, reading pending state.
    pub async fn greet(&self, address: Address) -> BlockchainResult<String> {
        let contract: HelloWorld::HelloWorldInstance<DynProvider, Ethereum> =
            HelloWorld::new(address, self.provider.clone());
        let call = contract.greet().block(BlockId::pending());

        bounded(self.timeout_duration, "greet", call.call())
            .await
            .map_err(|e| BlockchainError::Call(e.to_string()))
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}
