//! Request and response bodies for the inference endpoints.

use serde::{Deserialize, Serialize};

use crate::LoadState;

/// Which execution path produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Canned content, either requested via `force_mock` or a last resort.
    Mock,
    /// Output of a loaded model.
    #[serde(rename = "huggingface")]
    Model,
    /// Deterministic, dependency-free fallback.
    Heuristic,
    /// The model is not ready yet; retry later.
    Loading,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::Mock => "mock",
            Source::Model => "huggingface",
            Source::Heuristic => "heuristic",
            Source::Loading => "loading",
        };
        f.write_str(s)
    }
}

/// POST /summarize body. Either `text` or `transcript` carries the input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub force_mock: bool,
}

impl SummarizeRequest {
    /// The input text, preferring `text` over `transcript`. Blank values count as missing.
    pub fn input_text(&self) -> Option<&str> {
        non_blank(self.text.as_deref()).or_else(|| non_blank(self.transcript.as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub source: Source,
}

/// POST /generate-quiz body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub force_mock: bool,
}

impl QuizRequest {
    pub fn input_text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
    pub source: Source,
}

/// Body of the 202 response returned while a model is still loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingResponse {
    pub message: String,
    pub source: Source,
}

/// POST /cognitive-load body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CognitiveLoadRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
}

impl CognitiveLoadRequest {
    pub fn input_text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLoadResponse {
    pub chunks: Vec<String>,
    /// Flesch reading ease; `null` when scoring is disabled or not computable.
    pub readability_flesch: Option<f64>,
}

/// GET /models/status body: a snapshot of the readiness registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsStatus {
    /// Whether a model engine is configured at all.
    pub available: bool,
    pub summarizer_ready: bool,
    pub generator_ready: bool,
    pub background_loading_enabled: bool,
    pub summarizer_model: String,
    pub generator_model: String,
    #[serde(default = "default_state")]
    pub summarizer_state: LoadState,
    #[serde(default = "default_state")]
    pub generator_state: LoadState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarizer_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_error: Option<String>,
}

impl ModelsStatus {
    /// True once every capability can serve model output.
    pub fn all_ready(&self) -> bool {
        self.available && self.summarizer_ready && self.generator_ready
    }
}

fn default_state() -> LoadState {
    LoadState::NotStarted
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
