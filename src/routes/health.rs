use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub analyzer: String,
    pub storage: String,
}

fn binding_status(configured: bool) -> String {
    if configured { "configured" } else { "missing" }.to_string()
}

/// Health check endpoint
///
/// Reports whether the Gemini key and the snapshot bucket are configured.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        analyzer: binding_status(state.analyzer.is_some()),
        storage: binding_status(state.store.is_some()),
    })
}

/// Liveness probe for orchestration systems
async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "alive": true
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/liveness", get(liveness))
}
