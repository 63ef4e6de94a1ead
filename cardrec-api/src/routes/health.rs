//! Health check endpoints

use axum::{response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
struct LivenessResponse {
    status: &'static str,
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "ok" })
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/healthz", get(liveness))
}
