//! Service index and health routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

use super::extraction::API_PREFIX;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_index))
        .route("/health", get(get_health))
}

/// GET / — service index.
async fn get_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "DocForge document extraction API",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "document_extraction": API_PREFIX,
        },
        "limits": {
            "max_file_size_mb": state.config.limits.max_file_size_mb,
            "allowed_extensions": state.config.limits.allowed_extensions,
        },
    }))
}

/// GET /health — liveness probe.
async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
