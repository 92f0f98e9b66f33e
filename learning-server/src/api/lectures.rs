//! Lecture endpoints: transcript fetching and saved lectures.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use learning_common::{Lecture, NewLecture, Source, TranscriptRequest, TranscriptResponse};
use serde::Serialize;

use super::json_body;
use crate::error::{Error, Result};
use crate::state::AppState;
use crate::transcript::{extract_video_id, mock_transcript};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fetch-transcript", post(fetch_transcript))
        .route("/save-lecture", post(save_lecture))
        .route("/my-lectures", get(my_lectures))
}

/// POST /fetch-transcript
async fn fetch_transcript(
    payload: std::result::Result<Json<TranscriptRequest>, JsonRejection>,
) -> Result<Json<TranscriptResponse>> {
    let request = json_body(payload)?;
    let url = request
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::InvalidRequest("No url provided".to_string()))?;

    let video_id = extract_video_id(url);
    let transcript = mock_transcript(&video_id);

    Ok(Json(TranscriptResponse {
        video_id,
        transcript,
        source: Source::Mock,
    }))
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub message: String,
    pub id: i64,
}

/// POST /save-lecture
async fn save_lecture(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewLecture>, JsonRejection>,
) -> Result<Json<SavedResponse>> {
    let lecture = json_body(payload)?;
    let title = lecture
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::InvalidRequest("No title provided".to_string()))?;

    let id = state.store()?.save_lecture(title, &lecture)?;
    Ok(Json(SavedResponse {
        message: "Lecture saved".to_string(),
        id,
    }))
}

#[derive(Debug, Serialize)]
struct LecturesResponse {
    lectures: Vec<Lecture>,
}

/// GET /my-lectures
async fn my_lectures(State(state): State<Arc<AppState>>) -> Result<Json<LecturesResponse>> {
    let lectures = state.store()?.list_lectures()?;
    Ok(Json(LecturesResponse { lectures }))
}
