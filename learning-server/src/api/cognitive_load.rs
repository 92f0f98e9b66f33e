//! Cognitive load endpoint: splits text into digestible chunks.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use learning_common::{CognitiveLoadRequest, CognitiveLoadResponse};

use super::json_body;
use crate::error::{Error, Result};
use crate::inference::{chunk_text, flesch_reading_ease};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/cognitive-load", post(cognitive_load))
}

/// POST /cognitive-load
async fn cognitive_load(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CognitiveLoadRequest>, JsonRejection>,
) -> Result<Json<CognitiveLoadResponse>> {
    let request = json_body(payload)?;
    let text = request
        .input_text()
        .ok_or_else(|| Error::InvalidRequest("No text provided".to_string()))?;

    let max_chars = request
        .max_chunk_chars
        .unwrap_or(state.config.chunking.default_max_chars);
    if max_chars == 0 {
        return Err(Error::InvalidRequest(
            "max_chunk_chars must be greater than zero".to_string(),
        ));
    }

    let readability_flesch = if state.config.readability.enabled {
        flesch_reading_ease(text)
    } else {
        None
    };

    Ok(Json(CognitiveLoadResponse {
        chunks: chunk_text(text, max_chars),
        readability_flesch,
    }))
}
