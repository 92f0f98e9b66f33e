//! Lecture, progress and question records exchanged with the learning store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// POST /save-lecture body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLecture {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A weekly progress entry for a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub week: Option<String>,
    pub mastery: i64,
    pub engagement: i64,
    pub accuracy: i64,
}

/// POST /save-progress body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProgress {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub week: Option<String>,
    #[serde(default)]
    pub mastery: i64,
    #[serde(default)]
    pub engagement: i64,
    #[serde(default)]
    pub accuracy: i64,
}

/// A quiz question persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: i64,
    pub topic: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// GET /analyze-performance body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub entries: usize,
    pub average_mastery: Option<f64>,
    pub average_engagement: Option<f64>,
    pub average_accuracy: Option<f64>,
    /// The metric with the lowest average, if any entries exist.
    pub weakest_area: Option<String>,
}

/// POST /fetch-transcript body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub transcript: String,
    pub source: crate::Source,
}
