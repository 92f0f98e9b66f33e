//! Learning Platform Common Types
//!
//! Shared types used by the learning server and its readiness monitor.

pub mod capability;
pub mod inference;
pub mod learning;

pub use capability::{Capability, LoadState};
pub use inference::{
    CognitiveLoadRequest, CognitiveLoadResponse, LoadingResponse, ModelsStatus, QuizQuestion,
    QuizRequest, QuizResponse, Source, SummarizeRequest, SummarizeResponse,
};
pub use learning::{
    Lecture, NewLecture, NewProgress, PerformanceSummary, Progress, StoredQuestion,
    TranscriptRequest, TranscriptResponse,
};
