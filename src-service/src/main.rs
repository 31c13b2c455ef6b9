//! vadrec Background Service
//!
//! Continuously-running voice activity detection: reads live PCM from a
//! recorder child process, segments confirmed speech with a neural VAD
//! model, and writes each segment as a WAV file. Clients drive it over a
//! local HTTP control plane.

mod error;
mod http;
mod mic;
mod state;
mod vad;

use state::VadController;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vadrec_common::VadOptions;

fn main() {
    // Initialize logging with RUST_LOG env var support
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("vadrec service starting (pid: {})...", std::process::id());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async {
        let controller = Arc::new(VadController::new(VadOptions::default()));

        if let Err(e) = http::run_server(controller.clone(), shutdown_signal()).await {
            error!("control server error: {}", e);
            std::process::exit(1);
        }

        // Stop any active pipeline so the final segment is flushed
        let status = controller.stop().await;
        info!(
            "vadrec service stopped ({} segments saved)",
            status.segments_saved
        );
    });
}

/// Resolves when a termination signal arrives.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT");
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP");

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
            _ = sighup.recv() => info!("Received SIGHUP"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C");
    }
}
