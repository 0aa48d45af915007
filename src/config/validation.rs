//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0, port set)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TestsuiteConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::TestsuiteConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &TestsuiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.test.setup_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "test.setup_timeout_secs" });
    }
    if config.test.run_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "test.run_timeout_secs" });
    }
    if config.lambda.id.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "lambda.id" });
    }
    if config.blockchain.rpc_port == 0 {
        errors.push(ValidationError::Zero { field: "blockchain.rpc_port" });
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "blockchain.rpc_timeout_secs" });
    }
    if config.confirmation.max_attempts == 0 {
        errors.push(ValidationError::Zero { field: "confirmation.max_attempts" });
    }
    if config.accounts.list_command.is_empty() {
        errors.push(ValidationError::Empty { field: "accounts.list_command" });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TestsuiteConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TestsuiteConfig::default();
        config.confirmation.max_attempts = 0;
        config.blockchain.rpc_port = 0;
        config.accounts.list_command.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero { field: "confirmation.max_attempts" }));
        assert!(errors.contains(&ValidationError::Empty { field: "accounts.list_command" }));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = TestsuiteConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MetricsAddress("not-an-address".to_string())]
        );
    }
}
