//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub payments: &'static str,
    pub currency: String,
}

/// GET /health: liveness plus the configured backends.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: state.backends.store,
        payments: state.backends.payments,
        currency: state.orchestrator.currency().to_string(),
    })
}
