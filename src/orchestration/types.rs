//! Identifiers and error definitions shared by orchestration contexts.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Name a lambda is registered under in a network.
    LambdaId
);
string_id!(
    /// Identifier of a running service (container) in a network.
    ServiceId
);
string_id!(
    /// Identifier of a file shipped alongside the test suite.
    StaticFileId
);

/// Result of running a command inside a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    /// Combined stdout and stderr.
    pub logs: String,
}

/// Errors raised by orchestration contexts.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("lambda '{0}' has not been loaded")]
    UnknownLambda(LambdaId),

    #[error("lambda '{0}' is already loaded")]
    DuplicateLambda(LambdaId),

    #[error("no service with ID '{0}'")]
    UnknownService(ServiceId),

    #[error("no static file with ID '{0}'")]
    UnknownStaticFile(StaticFileId),

    #[error("lambda '{lambda_id}' failed: {reason}")]
    LambdaFailed { lambda_id: LambdaId, reason: String },

    #[error("command is empty")]
    EmptyCommand,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for orchestration operations.
pub type OrchestrationResult<T> = Result<T, OrchestrationError>;
