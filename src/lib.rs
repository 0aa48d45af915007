//! Ethereum end-to-end test harness library.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod orchestration;
pub mod testsuite;

pub use blockchain::{wait_for_confirmation, ConfirmationPolicy, ReceiptLookup};
pub use config::TestsuiteConfig;
pub use lifecycle::Shutdown;
pub use testsuite::{AdvancedTest, TestRunner};
