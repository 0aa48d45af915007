//! Test trait and the runner that enforces its deadlines.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{timeout, Instant};

use crate::lifecycle::shutdown::signalled;
use crate::lifecycle::Shutdown;
use crate::orchestration::NetworkContext;
use crate::testsuite::configuration::TestConfigurationBuilder;
use crate::testsuite::error::{TestsuiteError, TestsuiteResult};

/// An end-to-end test against an orchestrated network.
#[async_trait]
pub trait Test: Send + Sync {
    fn name(&self) -> &str;

    /// Declare the deadlines this test needs.
    fn configure(&self, builder: &mut TestConfigurationBuilder);

    /// Provision whatever the test needs, returning the network `run` sees.
    async fn setup(&self, network: Arc<dyn NetworkContext>) -> TestsuiteResult<Arc<dyn NetworkContext>>;

    async fn run(&self, network: Arc<dyn NetworkContext>) -> TestsuiteResult<()>;
}

/// Timing of a passed test.
#[derive(Debug, Clone)]
pub struct TestReport {
    pub name: String,
    pub setup_elapsed: Duration,
    pub run_elapsed: Duration,
}

/// Runs tests one at a time, each phase under its own deadline.
pub struct TestRunner {
    shutdown: broadcast::Receiver<()>,
}

impl TestRunner {
    /// Create a runner that aborts when `shutdown` is triggered.
    pub fn new(shutdown: &Shutdown) -> Self {
        Self {
            shutdown: shutdown.subscribe(),
        }
    }

    /// Configure, set up and run `test`.
    pub async fn execute(
        &mut self,
        test: &dyn Test,
        network: Arc<dyn NetworkContext>,
    ) -> TestsuiteResult<TestReport> {
        let mut builder = TestConfigurationBuilder::new();
        test.configure(&mut builder);
        let config = builder.build();
        let name = test.name().to_string();

        tracing::info!(
            test = %name,
            setup_timeout_secs = config.setup_timeout.as_secs(),
            run_timeout_secs = config.run_timeout.as_secs(),
            "Setting up test"
        );

        let started = Instant::now();
        let network = tokio::select! {
            biased;
            _ = signalled(&mut self.shutdown) => return Err(TestsuiteError::Aborted(name)),
            result = timeout(config.setup_timeout, test.setup(network)) => {
                result.map_err(|_| TestsuiteError::SetupTimeout {
                    test: name.clone(),
                    timeout: config.setup_timeout,
                })??
            }
        };
        let setup_elapsed = started.elapsed();

        tracing::info!(test = %name, elapsed_ms = setup_elapsed.as_millis() as u64, "Running test");

        let started = Instant::now();
        tokio::select! {
            biased;
            _ = signalled(&mut self.shutdown) => return Err(TestsuiteError::Aborted(name)),
            result = timeout(config.run_timeout, test.run(network)) => {
                result.map_err(|_| TestsuiteError::RunTimeout {
                    test: name.clone(),
                    timeout: config.run_timeout,
                })??
            }
        }
        let run_elapsed = started.elapsed();

        tracing::info!(test = %name, elapsed_ms = run_elapsed.as_millis() as u64, "Test passed");

        Ok(TestReport {
            name,
            setup_elapsed,
            run_elapsed,
        })
    }
}
