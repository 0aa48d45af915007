//! Test execution subsystem.
//!
//! # Data Flow
//! ```text
//! Test::configure → TestConfiguration (deadlines)
//! TestRunner::execute
//!     → Test::setup under setup deadline
//!     → Test::run under run deadline
//!     → TestReport | TestsuiteError
//! ```

pub mod advanced;
pub mod configuration;
pub mod error;
pub mod runner;

pub use advanced::AdvancedTest;
pub use configuration::{TestConfiguration, TestConfigurationBuilder};
pub use error::{TestsuiteError, TestsuiteResult};
pub use runner::{Test, TestReport, TestRunner};
