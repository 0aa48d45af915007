//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT/SIGTERM
//! - Translate them into a shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second signal while shutting down exits the process immediately

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers `shutdown` on Ctrl-C or SIGTERM.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received, aborting test");
        shutdown.trigger();

        wait_for_signal().await;
        tracing::warn!("Second shutdown signal received, exiting immediately");
        std::process::exit(130);
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
