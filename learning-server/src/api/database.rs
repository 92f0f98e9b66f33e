//! Database maintenance endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::Result;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/init-db", post(init_db))
        .route("/seed-db", post(seed_db))
        .route("/seed-questions", get(seed_db))
}

/// POST /init-db - create missing tables.
async fn init_db(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    state.store()?.init_schema()?;
    Ok(Json(json!({ "message": "Database initialized" })))
}

/// POST /seed-db (also GET /seed-questions) - insert the sample question set.
async fn seed_db(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let inserted = state.store()?.seed_questions()?;
    Ok(Json(json!({
        "message": "Database seeded",
        "questions_inserted": inserted,
    })))
}
