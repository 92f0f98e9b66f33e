//! Transcript summarization endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use learning_common::{Capability, SummarizeRequest, SummarizeResponse};

use super::{json_body, loading_response};
use crate::error::{Error, Result};
use crate::inference::Routed;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/summarize", post(summarize))
}

/// POST /summarize
async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let text = request
        .input_text()
        .ok_or_else(|| Error::InvalidRequest("No text provided".to_string()))?;

    match state.router.summarize(text, request.force_mock).await {
        Routed::Completed(result) => Ok(Json(SummarizeResponse {
            summary: result.payload,
            source: result.source,
        })
        .into_response()),
        Routed::Loading(load_state) => Ok(loading_response(Capability::Summarizer, load_state)),
    }
}
