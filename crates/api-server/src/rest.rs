//! Operational endpoints: health, readiness and liveness.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campaign_management::ManagementState;
use serde::Serialize;
use std::time::Instant;

/// Shared application state for operational handlers.
#[derive(Clone)]
pub struct AppState {
    pub management: ManagementState,
    pub node_id: String,
    pub start_time: Instant,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.management.sessions.len(),
        campaigns: state.management.store.campaign_count(),
    })
}

/// GET /ready. Readiness probe for Kubernetes.
pub async fn readiness(State(_state): State<AppState>) -> StatusCode {
    StatusCode::OK
}

/// GET /live. Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub campaigns: usize,
}
