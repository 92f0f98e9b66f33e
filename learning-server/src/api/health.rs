//! Health check endpoint.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /health - always succeeds, independent of model loading progress.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Learning API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
