//! Per-test configuration.

use std::time::Duration;

/// Deadlines a test asks the runner to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestConfiguration {
    pub setup_timeout: Duration,
    pub run_timeout: Duration,
}

impl Default for TestConfiguration {
    fn default() -> Self {
        TestConfigurationBuilder::new().build()
    }
}

/// Builder handed to `Test::configure`.
#[derive(Debug, Clone)]
pub struct TestConfigurationBuilder {
    setup_timeout_secs: u64,
    run_timeout_secs: u64,
}

impl TestConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            setup_timeout_secs: 180,
            run_timeout_secs: 180,
        }
    }

    pub fn with_setup_timeout_secs(&mut self, secs: u64) -> &mut Self {
        self.setup_timeout_secs = secs;
        self
    }

    pub fn with_run_timeout_secs(&mut self, secs: u64) -> &mut Self {
        self.run_timeout_secs = secs;
        self
    }

    pub fn build(&self) -> TestConfiguration {
        TestConfiguration {
            setup_timeout: Duration::from_secs(self.setup_timeout_secs),
            run_timeout: Duration::from_secs(self.run_timeout_secs),
        }
    }
}

impl Default for TestConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
