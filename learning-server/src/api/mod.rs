//! HTTP API.

pub mod cognitive_load;
pub mod database;
pub mod health;
pub mod lectures;
pub mod models;
pub mod progress;
pub mod quiz;
pub mod summarize;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use learning_common::{Capability, LoadState, LoadingResponse, Source};

use crate::error::{Error, Result};
use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(models::router())
        .merge(summarize::router())
        .merge(quiz::router())
        .merge(cognitive_load::router())
        .merge(lectures::router())
        .merge(progress::router())
        .merge(database::router())
}

/// Unwrap a JSON body, turning extractor rejections into `{error}` responses.
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| Error::InvalidRequest(format!("Invalid JSON body: {}", e.body_text())))
}

/// 202 response telling the caller to retry once the model is ready.
pub(crate) fn loading_response(capability: Capability, state: LoadState) -> Response {
    let message = match state {
        LoadState::Failed => format!("The {} model failed to load; retry later", capability),
        _ => format!("The {} model is still loading; retry shortly", capability),
    };
    let body = LoadingResponse {
        message,
        source: Source::Loading,
    };
    (StatusCode::ACCEPTED, Json(body)).into_response()
}
