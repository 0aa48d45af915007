//! Deploy-and-confirm test against an Ethereum network provisioned by a lambda.
//!
//! # Flow
//! ```text
//! setup: load lambda
//! run:   execute lambda → parse result → bootnode service
//!        → dial RPC → decrypt signer keystore
//!        → deploy greeter → wait until mined → greet()
//!        → list accounts inside the bootnode
//! ```

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::blockchain::client::rpc_url;
use crate::blockchain::confirmation::wait_for_confirmation;
use crate::blockchain::transaction::parse_bytecode;
use crate::blockchain::{BlockchainClient, ContractDeployer, Wallet};
use crate::config::TestsuiteConfig;
use crate::orchestration::{
    EthereumLambdaResult, LambdaId, NetworkContext, ServiceContext, StaticFileId,
};
use crate::testsuite::configuration::TestConfigurationBuilder;
use crate::testsuite::error::{TestsuiteError, TestsuiteResult};
use crate::testsuite::runner::Test;

/// Parameters the lambda is executed with.
const EXECUTE_PARAMS: &str = "{}";

/// Deploys the greeter contract and checks the network answers.
pub struct AdvancedTest {
    config: TestsuiteConfig,
}

impl AdvancedTest {
    pub fn new(config: TestsuiteConfig) -> Self {
        Self { config }
    }

    fn lambda_id(&self) -> LambdaId {
        LambdaId::from(self.config.lambda.id.as_str())
    }

    async fn decrypt_signer(
        &self,
        service: &dyn ServiceContext,
        lambda_result: &EthereumLambdaResult,
    ) -> TestsuiteResult<Wallet> {
        let keystore_id = &lambda_result.signer_keystore_static_file_id;
        let password_id = &lambda_result.password_static_file_id;
        let file_ids = vec![keystore_id.clone(), password_id.clone()];

        let paths = service
            .load_static_files(&file_ids)
            .await
            .map_err(|source| TestsuiteError::StaticFiles {
                file_ids: file_ids.clone(),
                source,
            })?;

        let keystore_path = static_file_path(&paths, keystore_id)?;
        let password_path = static_file_path(&paths, password_id)?;
        let password = read_file(&password_path).await?;

        Ok(Wallet::load_keystore(keystore_path, password, self.config.blockchain.chain_id).await?)
    }

    async fn load_bytecode(&self) -> TestsuiteResult<alloy::primitives::Bytes> {
        let path = self
            .config
            .contract
            .bytecode_path
            .as_ref()
            .ok_or(TestsuiteError::MissingBytecode)?;
        let hex = read_file(path).await?;
        Ok(parse_bytecode(&String::from_utf8_lossy(&hex))?)
    }

    async fn list_accounts(&self, service: &dyn ServiceContext) -> TestsuiteResult<()> {
        let command = self.config.accounts.list_command.clone();
        let output = service
            .exec_command(&command)
            .await
            .map_err(|source| TestsuiteError::ExecCommand {
                command: command.clone(),
                source,
            })?;

        if output.exit_code != self.config.accounts.expected_exit_code {
            return Err(TestsuiteError::CommandFailed {
                command,
                exit_code: output.exit_code,
                logs: output.logs,
            });
        }

        tracing::info!(
            service_id = %service.service_id(),
            accounts = %output.logs.trim(),
            "Listed node accounts"
        );
        Ok(())
    }
}

#[async_trait]
impl Test for AdvancedTest {
    fn name(&self) -> &str {
        "advanced"
    }

    fn configure(&self, builder: &mut TestConfigurationBuilder) {
        builder
            .with_setup_timeout_secs(self.config.test.setup_timeout_secs)
            .with_run_timeout_secs(self.config.test.run_timeout_secs);
    }

    async fn setup(&self, network: Arc<dyn NetworkContext>) -> TestsuiteResult<Arc<dyn NetworkContext>> {
        let lambda_id = self.lambda_id();
        network
            .load_lambda(&lambda_id, &self.config.lambda.image, &self.config.lambda.params)
            .await
            .map_err(|source| TestsuiteError::LoadLambda {
                lambda_id: lambda_id.clone(),
                source,
            })?;

        tracing::info!(lambda_id = %lambda_id, "The Ethereum lambda has been successfully added to the test");
        Ok(network)
    }

    async fn run(&self, network: Arc<dyn NetworkContext>) -> TestsuiteResult<()> {
        let lambda_id = self.lambda_id();
        let lambda_error = |source| TestsuiteError::ExecuteLambda {
            lambda_id: lambda_id.clone(),
            source,
        };

        let lambda = network.get_lambda_context(&lambda_id).await.map_err(lambda_error)?;
        let response = lambda.execute(EXECUTE_PARAMS).await.map_err(lambda_error)?;
        let lambda_result =
            EthereumLambdaResult::from_json(&response).map_err(TestsuiteError::LambdaResult)?;

        let bootnode_id = &lambda_result.bootnode_service_id;
        let service = network
            .get_service_context(bootnode_id)
            .await
            .map_err(|source| TestsuiteError::ServiceContext {
                service_id: bootnode_id.clone(),
                source,
            })?;
        tracing::info!(service_id = %service.service_id(), ip = %service.ip_address(), "Got bootnode service context");

        let blockchain_config = self.config.blockchain.clone();
        let client = BlockchainClient::connect(service.ip_address(), blockchain_config.clone())?;
        if let Err(e) = client.verify_chain_id().await {
            tracing::warn!(error = %e, "Chain verification failed, continuing");
        }

        let wallet = self.decrypt_signer(service.as_ref(), &lambda_result).await?;
        let deployer = ContractDeployer::new(
            rpc_url(service.ip_address(), blockchain_config.rpc_port)?,
            wallet,
            blockchain_config,
        );

        let bytecode = self.load_bytecode().await?;
        let deployment = deployer.deploy(bytecode).await?;

        let policy = self.config.confirmation.policy()?;
        let confirmation = wait_for_confirmation(&client, deployment.tx_hash, &policy).await?;
        if !confirmation.succeeded {
            return Err(TestsuiteError::DeploymentReverted(deployment.tx_hash));
        }
        tracing::info!(
            contract = %deployment.address,
            block_number = confirmation.block_number,
            attempts = confirmation.attempts,
            gas_used = confirmation.gas_used,
            "Deployed Hello World contract"
        );

        let greeting = deployer.greet(deployment.address).await?;
        tracing::info!(greeting = %greeting, "Pending greeting");

        self.list_accounts(service.as_ref()).await
    }
}

fn static_file_path(
    paths: &std::collections::HashMap<StaticFileId, PathBuf>,
    file_id: &StaticFileId,
) -> TestsuiteResult<PathBuf> {
    paths
        .get(file_id)
        .cloned()
        .ok_or_else(|| TestsuiteError::MissingStaticFile(file_id.clone()))
}

async fn read_file(path: &std::path::Path) -> TestsuiteResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| TestsuiteError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
}
