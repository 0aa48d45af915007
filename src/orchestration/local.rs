//! Config-backed network for running tests against an already provisioned
//! chain.
//!
//! # Responsibilities
//! - Register lambdas whose result is a JSON file on disk
//! - Resolve service IDs to IP addresses from configuration
//! - Resolve static file IDs to local paths
//! - Run service commands as local processes

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;

use crate::config::schema::{LambdaConfig, NetworkConfig};
use crate::orchestration::context::{LambdaContext, NetworkContext, ServiceContext};
use crate::orchestration::types::{
    ExecOutput, LambdaId, OrchestrationError, OrchestrationResult, ServiceId, StaticFileId,
};

/// A network whose topology comes from configuration instead of an
/// orchestration engine.
#[derive(Debug, Default)]
pub struct LocalNetwork {
    /// Loaded lambdas.
    lambdas: DashMap<LambdaId, Arc<LocalLambda>>,
    /// Where each lambda's result JSON lives.
    lambda_results: HashMap<LambdaId, PathBuf>,
    services: HashMap<ServiceId, String>,
    static_files: Arc<HashMap<StaticFileId, PathBuf>>,
}

impl LocalNetwork {
    /// Build a network from the `[network]` section.
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            lambdas: DashMap::new(),
            lambda_results: HashMap::new(),
            services: network
                .services
                .iter()
                .map(|(id, ip)| (ServiceId::from(id.as_str()), ip.clone()))
                .collect(),
            static_files: Arc::new(
                network
                    .static_files
                    .iter()
                    .map(|(id, path)| (StaticFileId::from(id.as_str()), path.clone()))
                    .collect(),
            ),
        }
    }

    /// Build a network from the `[network]` and `[lambda]` sections.
    pub fn from_config(network: &NetworkConfig, lambda: &LambdaConfig) -> Self {
        let mut local = Self::new(network);
        if let Some(path) = &lambda.result_path {
            local = local.with_lambda_result(LambdaId::from(lambda.id.as_str()), path.clone());
        }
        local
    }

    /// Make `lambda_id` return the contents of `result_path` when executed.
    pub fn with_lambda_result(mut self, lambda_id: LambdaId, result_path: PathBuf) -> Self {
        self.lambda_results.insert(lambda_id, result_path);
        self
    }

    /// Number of loaded lambdas.
    pub fn lambda_count(&self) -> usize {
        self.lambdas.len()
    }
}

#[async_trait]
impl NetworkContext for LocalNetwork {
    async fn load_lambda(
        &self,
        lambda_id: &LambdaId,
        image: &str,
        params: &str,
    ) -> OrchestrationResult<Arc<dyn LambdaContext>> {
        let lambda = Arc::new(LocalLambda {
            id: lambda_id.clone(),
            result_path: self.lambda_results.get(lambda_id).cloned(),
        });

        match self.lambdas.entry(lambda_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(OrchestrationError::DuplicateLambda(lambda_id.clone()));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(lambda.clone());
            }
        }

        tracing::info!(lambda_id = %lambda_id, image = image, params = params, "Lambda loaded");
        Ok(lambda)
    }

    async fn get_lambda_context(&self, lambda_id: &LambdaId) -> OrchestrationResult<Arc<dyn LambdaContext>> {
        self.lambdas
            .get(lambda_id)
            .map(|entry| entry.value().clone() as Arc<dyn LambdaContext>)
            .ok_or_else(|| OrchestrationError::UnknownLambda(lambda_id.clone()))
    }

    async fn get_service_context(&self, service_id: &ServiceId) -> OrchestrationResult<Arc<dyn ServiceContext>> {
        let ip_address = self
            .services
            .get(service_id)
            .ok_or_else(|| OrchestrationError::UnknownService(service_id.clone()))?;

        Ok(Arc::new(LocalService {
            id: service_id.clone(),
            ip_address: ip_address.clone(),
            static_files: self.static_files.clone(),
        }))
    }
}

/// A lambda that replays a JSON result from disk.
#[derive(Debug)]
pub struct LocalLambda {
    id: LambdaId,
    result_path: Option<PathBuf>,
}

#[async_trait]
impl LambdaContext for LocalLambda {
    fn lambda_id(&self) -> &LambdaId {
        &self.id
    }

    async fn execute(&self, params: &str) -> OrchestrationResult<String> {
        let path = self.result_path.as_ref().ok_or_else(|| OrchestrationError::LambdaFailed {
            lambda_id: self.id.clone(),
            reason: "no result file configured".to_string(),
        })?;

        tracing::debug!(lambda_id = %self.id, params = params, path = %path.display(), "Executing lambda");
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// A service reachable at a fixed address whose commands run locally.
#[derive(Debug)]
pub struct LocalService {
    id: ServiceId,
    ip_address: String,
    static_files: Arc<HashMap<StaticFileId, PathBuf>>,
}

#[async_trait]
impl ServiceContext for LocalService {
    fn service_id(&self) -> &ServiceId {
        &self.id
    }

    fn ip_address(&self) -> &str {
        &self.ip_address
    }

    async fn load_static_files(
        &self,
        file_ids: &[StaticFileId],
    ) -> OrchestrationResult<HashMap<StaticFileId, PathBuf>> {
        let mut loaded = HashMap::with_capacity(file_ids.len());
        for file_id in file_ids {
            let path = self
                .static_files
                .get(file_id)
                .ok_or_else(|| OrchestrationError::UnknownStaticFile(file_id.clone()))?;
            loaded.insert(file_id.clone(), tokio::fs::canonicalize(path).await?);
        }
        Ok(loaded)
    }

    async fn exec_command(&self, command: &[String]) -> OrchestrationResult<ExecOutput> {
        let (program, args) = command.split_first().ok_or(OrchestrationError::EmptyCommand)?;

        tracing::debug!(service_id = %self.id, command = ?command, "Executing command");
        let output = Command::new(program).args(args).output().await?;

        let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            logs,
        })
    }
}
