//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → test runner aborts setup/run
//!               → confirmation waits return Cancelled
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
