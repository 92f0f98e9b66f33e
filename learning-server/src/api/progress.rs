//! Learner progress endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use learning_common::{NewProgress, PerformanceSummary};

use super::json_body;
use super::lectures::SavedResponse;
use crate::error::{Error, Result};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/save-progress", post(save_progress))
        .route("/analyze-performance", get(analyze_performance))
}

/// POST /save-progress
async fn save_progress(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewProgress>, JsonRejection>,
) -> Result<Json<SavedResponse>> {
    let progress = json_body(payload)?;
    let user_id = progress
        .user_id
        .ok_or_else(|| Error::InvalidRequest("No user_id provided".to_string()))?;

    for (name, value) in [
        ("mastery", progress.mastery),
        ("engagement", progress.engagement),
        ("accuracy", progress.accuracy),
    ] {
        if !(0..=100).contains(&value) {
            return Err(Error::InvalidRequest(format!(
                "{} must be between 0 and 100",
                name
            )));
        }
    }

    let id = state.store()?.save_progress(
        user_id,
        progress.week.as_deref(),
        progress.mastery,
        progress.engagement,
        progress.accuracy,
    )?;

    Ok(Json(SavedResponse {
        message: "Progress saved".to_string(),
        id,
    }))
}

/// GET /analyze-performance
async fn analyze_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PerformanceSummary>> {
    Ok(Json(state.store()?.performance_summary()?))
}
