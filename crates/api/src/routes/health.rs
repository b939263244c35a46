//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of invoices currently in the audit queue.
    pub queue_depth: usize,
}

/// Health check handler. Reports the audit queue depth alongside liveness.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let queue_depth = state.invoices.read().await.len();
    Json(HealthResponse {
        status: "healthy",
        service: "waybill",
        version: env!("CARGO_PKG_VERSION"),
        queue_depth,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
