//! Health check handlers.

use crate::constants::READINESS_TIMEOUT;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Liveness check: the process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness check: the encoder binary answers `-version`.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ffmpeg = state.pipeline.ffmpeg();

    let mut response = serde_json::json!({
        "status": "ready",
        "ffmpeg": "unknown",
        "encoder_slots_available": ffmpeg.available_slots(),
    });

    let mut overall_ready = true;
    match tokio::time::timeout(READINESS_TIMEOUT, ffmpeg.version()).await {
        Ok(Ok(version)) => {
            response["ffmpeg"] = serde_json::json!("ready");
            response["ffmpeg_version"] = serde_json::json!(version);
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Encoder readiness check failed");
            response["ffmpeg"] = serde_json::json!(format!("not_ready: {}", e));
            overall_ready = false;
        }
        Err(_) => {
            tracing::error!("Encoder readiness check timed out");
            response["ffmpeg"] = serde_json::json!("timeout");
            overall_ready = false;
        }
    }

    let status_code = if overall_ready {
        StatusCode::OK
    } else {
        response["status"] = serde_json::json!("not_ready");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
