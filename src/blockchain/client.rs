//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Dial a node's JSON-RPC endpoint
//! - Query chain state (chain id, block number, receipts, accounts)
//! - Bound every call with the configured timeout
//! - Serve as the receipt source for confirmation polling

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::confirmation::ReceiptLookup;
use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ReceiptSummary,
};
use crate::observability::metrics;

/// Build the HTTP JSON-RPC URL for a node reachable at `ip_address`.
pub fn rpc_url(ip_address: &str, port: u16) -> BlockchainResult<url::Url> {
    let raw = format!("http://{}:{}", ip_address, port);
    raw.parse()
        .map_err(|e| BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", raw, e)))
}

/// Run one RPC call under `limit`, mapping failures to [`BlockchainError`].
pub(crate) async fn bounded<T, E, F>(limit: Duration, method: &'static str, fut: F) -> BlockchainResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match timeout(limit, fut).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => {
            tracing::warn!(method = method, error = %e, "RPC error");
            Err(BlockchainError::Rpc(format!("{} failed: {}", method, e)))
        }
        Err(_) => {
            tracing::warn!(method = method, "RPC timeout");
            Err(BlockchainError::Timeout(limit.as_secs()))
        }
    }
}

/// Read-only JSON-RPC client for one node.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    url: url::Url,
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a client for the node at `ip_address` on the configured RPC port.
    ///
    /// No request is made; an unreachable node surfaces on first use.
    pub fn connect(ip_address: &str, config: BlockchainConfig) -> BlockchainResult<Self> {
        let url = rpc_url(ip_address, config.rpc_port)?;
        Ok(Self::from_url(url, config))
    }

    /// Create a client for an explicit endpoint URL.
    pub fn from_url(url: url::Url, config: BlockchainConfig) -> Self {
        let provider = Arc::new(ProviderBuilder::new().connect_http(url.clone()))
            as Arc<dyn Provider + Send + Sync>;

        tracing::info!(rpc_url = %url, chain_id = config.chain_id, "Blockchain client created");

        Self {
            provider,
            url,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        }
    }

    async fn call<T, E, F>(&self, method: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        bounded(self.timeout_duration, method, fut).await
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.call("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        let receipt = self
            .call(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(tx_hash),
            )
            .await?;

        Ok(receipt.map(|r| ReceiptSummary {
            block_number: r.block_number(),
            status: r.status(),
            contract_address: r.contract_address(),
            gas_used: r.gas_used(),
        }))
    }

    /// List the accounts managed by the node.
    pub async fn get_accounts(&self) -> BlockchainResult<Vec<Address>> {
        self.call("eth_accounts", self.provider.get_accounts()).await
    }

    /// Check if the node is reachable.
    ///
    /// Returns true if we can query the block number.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_rpc_health(self.url.as_str(), healthy);
        healthy
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

#[async_trait]
impl ReceiptLookup for BlockchainClient {
    async fn lookup_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        self.get_transaction_receipt(tx_hash).await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.url.as_str())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            rpc_timeout_secs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_rpc_url() {
        let url = rpc_url("172.23.0.4", 8545).unwrap();
        assert_eq!(url.as_str(), "http://172.23.0.4:8545/");
    }

    #[test]
    fn test_invalid_rpc_url() {
        let err = rpc_url("not a host", 8545).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_client_creation_does_not_dial() {
        let client = BlockchainClient::connect("127.0.0.1", test_config()).unwrap();
        assert_eq!(client.url().port(), Some(8545));
        assert!(format!("{:?}", client).contains("127.0.0.1:8545"));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_an_rpc_error() {
        // Port 9 (discard) has nothing speaking JSON-RPC on it
        let config = BlockchainConfig {
            rpc_port: 9,
            ..test_config()
        };
        let client = BlockchainClient::connect("127.0.0.1", config).unwrap();

        let result = client.lookup_receipt(TxHash::ZERO).await;
        assert!(matches!(
            result,
            Err(BlockchainError::Rpc(_)) | Err(BlockchainError::Timeout(_))
        ));
        assert!(!client.is_healthy().await);
    }
}
