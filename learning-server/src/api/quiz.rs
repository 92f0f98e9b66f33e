//! Quiz generation endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use learning_common::{Capability, QuizRequest, QuizResponse, StoredQuestion};
use serde::Serialize;

use super::{json_body, loading_response};
use crate::error::{Error, Result};
use crate::inference::Routed;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/generate-quiz", get(stored_quiz).post(generate_quiz))
}

/// POST /generate-quiz - questions generated from the given text.
async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let text = request
        .input_text()
        .ok_or_else(|| Error::InvalidRequest("No text provided".to_string()))?;

    match state.router.generate_quiz(text, request.force_mock).await {
        Routed::Completed(result) => Ok(Json(QuizResponse {
            questions: result.payload,
            source: result.source,
        })
        .into_response()),
        Routed::Loading(load_state) => Ok(loading_response(Capability::Generator, load_state)),
    }
}

#[derive(Debug, Serialize)]
struct StoredQuizResponse {
    questions: Vec<StoredQuestion>,
}

/// GET /generate-quiz - questions from the learning store.
async fn stored_quiz(State(state): State<Arc<AppState>>) -> Result<Json<StoredQuizResponse>> {
    let questions = state.store()?.list_questions()?;
    Ok(Json(StoredQuizResponse { questions }))
}
