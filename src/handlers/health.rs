//! # Health Handler
//!
//! Liveness endpoint used by the frontend and deploy checks. Reports whether
//! an upstream API key is configured without revealing its value.

use axum::{extract::State, response::Json};

use crate::models::HealthStatus;
use crate::server::AppState;

/// Reports service health and API key presence
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health report", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::report(
        state.config.configured_api_key().is_some(),
    ))
}
