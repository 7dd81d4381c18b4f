//! Health check endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub catalog: CatalogHealthResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogHealthResponse {
    pub templates: usize,
}

/// GET /health - Liveness and basic statistics
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        catalog: CatalogHealthResponse {
            templates: state.catalog.count(),
        },
    })
}
