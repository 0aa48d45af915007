//! Errors surfaced by tests and the runner.

use alloy::primitives::TxHash;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, ConfirmationError, PolicyError};
use crate::orchestration::types::{LambdaId, OrchestrationError, ServiceId, StaticFileId};

/// Why a test failed.
#[derive(Debug, Error)]
pub enum TestsuiteError {
    #[error("test '{test}' setup did not finish within {timeout:?}")]
    SetupTimeout { test: String, timeout: Duration },

    #[error("test '{test}' run did not finish within {timeout:?}")]
    RunTimeout { test: String, timeout: Duration },

    #[error("test '{0}' aborted by shutdown signal")]
    Aborted(String),

    #[error("An error occurred loading lambda '{lambda_id}'")]
    LoadLambda {
        lambda_id: LambdaId,
        #[source]
        source: OrchestrationError,
    },

    #[error("An error occurred executing lambda '{lambda_id}'")]
    ExecuteLambda {
        lambda_id: LambdaId,
        #[source]
        source: OrchestrationError,
    },

    #[error("An error occurred deserializing the lambda response")]
    LambdaResult(#[source] serde_json::Error),

    #[error("An error occurred getting the service context for '{service_id}'")]
    ServiceContext {
        service_id: ServiceId,
        #[source]
        source: OrchestrationError,
    },

    #[error("An error occurred loading static files {file_ids:?}")]
    StaticFiles {
        file_ids: Vec<StaticFileId>,
        #[source]
        source: OrchestrationError,
    },

    #[error("No filepath found for static file '{0}'")]
    MissingStaticFile(StaticFileId),

    #[error("An error occurred reading '{path}'")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No contract bytecode configured")]
    MissingBytecode,

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error("Invalid confirmation policy")]
    Policy(#[from] PolicyError),

    #[error("An error occurred waiting for the contract deployment to be mined")]
    Confirmation(#[from] ConfirmationError),

    #[error("Deployment transaction '{0}' was mined but reverted")]
    DeploymentReverted(TxHash),

    #[error("Executing {command:?} returned an error")]
    ExecCommand {
        command: Vec<String>,
        #[source]
        source: OrchestrationError,
    },

    #[error("Executing {command:?} returned exit code {exit_code} with logs: {logs}")]
    CommandFailed {
        command: Vec<String>,
        exit_code: i32,
        logs: String,
    },
}

/// Result type for test operations.
pub type TestsuiteResult<T> = Result<T, TestsuiteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_source_is_preserved() {
        let err = TestsuiteError::ServiceContext {
            service_id: ServiceId::from("bootnode"),
            source: OrchestrationError::UnknownService(ServiceId::from("bootnode")),
        };
        assert!(err.to_string().contains("'bootnode'"));
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("no service with ID 'bootnode'".to_string())
        );
    }

    #[test]
    fn test_confirmation_error_converts() {
        let err: TestsuiteError = ConfirmationError::Cancelled {
            tx_hash: TxHash::ZERO,
            attempts: 2,
        }
        .into();
        assert!(matches!(err, TestsuiteError::Confirmation(_)));
    }
}
