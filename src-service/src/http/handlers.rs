//! Control-plane request handlers.

use crate::state::VadController;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{error, info};
use vadrec_common::api::{AckResponse, ControlResponse, HealthResponse};
use vadrec_common::{VadOptions, VadOptionsPatch, VadStatus};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

pub async fn status(State(controller): State<Arc<VadController>>) -> Json<VadStatus> {
    Json(controller.status())
}

/// `POST /start`, optionally carrying an options patch applied first.
pub async fn start(
    State(controller): State<Arc<VadController>>,
    patch: Option<Json<VadOptionsPatch>>,
) -> Response {
    let patch = patch.map(|Json(patch)| patch);
    match controller.start(patch).await {
        Ok(status) => {
            info!("start accepted");
            Json(ControlResponse::success(status)).into_response()
        }
        Err(err) => {
            error!("start rejected: {}", err);
            (
                StatusCode::BAD_REQUEST,
                Json(ControlResponse::failure(err.to_string())),
            )
                .into_response()
        }
    }
}

/// `POST /stop`. Always succeeds; stopping an idle service is a no-op.
pub async fn stop(State(controller): State<Arc<VadController>>) -> Json<ControlResponse> {
    let status = controller.stop().await;
    Json(ControlResponse::success(status))
}

pub async fn get_options(State(controller): State<Arc<VadController>>) -> Json<VadOptions> {
    Json(controller.options().await)
}

pub async fn patch_options(
    State(controller): State<Arc<VadController>>,
    Json(patch): Json<VadOptionsPatch>,
) -> Response {
    match controller.update_options(&patch).await {
        Ok(()) => Json(AckResponse::ok()).into_response(),
        Err(err) => {
            error!("options update rejected: {}", err);
            (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::failure(err.to_string())),
            )
                .into_response()
        }
    }
}
