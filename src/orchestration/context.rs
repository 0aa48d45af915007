//! Orchestration context traits.
//!
//! The test code only sees these traits; which backend provisions the
//! network (a remote orchestration engine, or [`super::local::LocalNetwork`])
//! is decided by the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::orchestration::types::{
    ExecOutput, LambdaId, OrchestrationResult, ServiceId, StaticFileId,
};

/// A provisioned network: lambdas and services reachable by ID.
#[async_trait]
pub trait NetworkContext: Send + Sync {
    /// Register a lambda implemented by `image`, initialized with JSON `params`.
    async fn load_lambda(
        &self,
        lambda_id: &LambdaId,
        image: &str,
        params: &str,
    ) -> OrchestrationResult<Arc<dyn LambdaContext>>;

    /// Look up a previously loaded lambda.
    async fn get_lambda_context(&self, lambda_id: &LambdaId) -> OrchestrationResult<Arc<dyn LambdaContext>>;

    /// Look up a running service.
    async fn get_service_context(&self, service_id: &ServiceId) -> OrchestrationResult<Arc<dyn ServiceContext>>;
}

/// A loaded lambda.
#[async_trait]
pub trait LambdaContext: Send + Sync {
    fn lambda_id(&self) -> &LambdaId;

    /// Run the lambda with JSON `params`, returning its JSON result.
    async fn execute(&self, params: &str) -> OrchestrationResult<String>;
}

/// A running service.
#[async_trait]
pub trait ServiceContext: Send + Sync {
    fn service_id(&self) -> &ServiceId;

    fn ip_address(&self) -> &str;

    /// Make the given static files available, returning their absolute paths.
    async fn load_static_files(
        &self,
        file_ids: &[StaticFileId],
    ) -> OrchestrationResult<HashMap<StaticFileId, PathBuf>>;

    /// Run `command` (argv form) inside the service.
    async fn exec_command(&self, command: &[String]) -> OrchestrationResult<ExecOutput>;
}
