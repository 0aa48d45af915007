//! Network orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkContext::load_lambda (setup)
//!     → LambdaContext::execute → JSON (lambda.rs parses it)
//!     → NetworkContext::get_service_context(bootnode)
//!     → ServiceContext (IP address, static files, exec)
//! ```
//!
//! # Design Decisions
//! - Contexts are traits passed explicitly to the test; no ambient network
//! - local.rs backs them with configuration for already-running chains

pub mod context;
pub mod lambda;
pub mod local;
pub mod types;

pub use context::{LambdaContext, NetworkContext, ServiceContext};
pub use lambda::EthereumLambdaResult;
pub use local::LocalNetwork;
pub use types::{
    ExecOutput, LambdaId, OrchestrationError, OrchestrationResult, ServiceId, StaticFileId,
};
