//! Control-plane HTTP server.

use super::handlers;
use crate::state::VadController;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use vadrec_common::api::{
    DEFAULT_PORT, HEALTH_PATH, OPTIONS_PATH, START_PATH, STATUS_PATH, STOP_PATH,
};

pub fn router(controller: Arc<VadController>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(STATUS_PATH, get(handlers::status))
        .route(START_PATH, post(handlers::start))
        .route(STOP_PATH, post(handlers::stop))
        .route(
            OPTIONS_PATH,
            get(handlers::get_options).patch(handlers::patch_options),
        )
        .with_state(controller)
}

/// Bind on `PORT` (default 5173) and serve until the shutdown future
/// resolves.
pub async fn run_server(
    controller: Arc<VadController>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("control server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(controller))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
