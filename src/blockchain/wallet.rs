//! Signer loading from encrypted keystores.
//!
//! # Security
//! - Keys are decrypted in memory only and never logged or serialized
//! - The password is used exactly as read from its file

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use std::path::{Path, PathBuf};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A decrypted signing key bound to a chain.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Decrypt a V3 JSON keystore file.
    ///
    /// # Arguments
    /// * `keystore_path` - Path to the keystore JSON
    /// * `password` - Keystore password bytes
    /// * `chain_id` - Chain ID for EIP-155 replay protection
    pub fn from_keystore(
        keystore_path: &Path,
        password: impl AsRef<[u8]>,
        chain_id: u64,
    ) -> BlockchainResult<Self> {
        let signer = PrivateKeySigner::decrypt_keystore(keystore_path, password).map_err(|e| {
            BlockchainError::Wallet(format!(
                "An error occurred when trying to decrypt the private key in '{}': {}",
                keystore_path.display(),
                e
            ))
        })?;

        Ok(Self::from_signer(signer, chain_id))
    }

    /// [`Wallet::from_keystore`] on the blocking pool; scrypt with geth's
    /// default parameters takes about a second.
    pub async fn load_keystore(
        keystore_path: PathBuf,
        password: Vec<u8>,
        chain_id: u64,
    ) -> BlockchainResult<Self> {
        tokio::task::spawn_blocking(move || Self::from_keystore(&keystore_path, password, chain_id))
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Keystore decryption task failed: {}", e)))?
    }

    /// Create a wallet from a hex-encoded private key string.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::info!(address = %signer.address(), chain_id = chain_id, "Wallet initialized");

        Self { signer }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet signs for.
    pub fn chain_id(&self) -> Option<u64> {
        self.signer.chain_id()
    }

    /// Network wallet for signing transactions through a provider.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
