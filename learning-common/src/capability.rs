//! Capability types for the inference pipeline.

use serde::{Deserialize, Serialize};

/// Named inference capabilities the platform can serve.
///
/// Each capability is backed by one model whose lifecycle is independent of
/// the HTTP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Transcript summarization
    Summarizer,
    /// Free-text generation, used for quiz questions
    Generator,
}

impl Capability {
    /// All capability variants for iteration.
    pub const ALL: [Capability; 2] = [Capability::Summarizer, Capability::Generator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Summarizer => "summarizer",
            Capability::Generator => "generator",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load state of a capability's model.
///
/// Transitions are monotonic within one process lifetime:
/// `NotStarted -> Loading -> {Ready | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    NotStarted,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    /// Whether the load attempt has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed)
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoadState::NotStarted => "not_started",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        };
        f.write_str(s)
    }
}
