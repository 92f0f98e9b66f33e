//! Inference fallback pipeline.
//!
//! The router picks an execution path per request; the heuristic engines,
//! chunker and readability scorer are deterministic and never fail.

pub mod chunker;
pub mod extract;
pub mod heuristic;
pub mod readability;
pub mod router;

pub use chunker::chunk_text;
pub use extract::{extract_questions, ExtractError};
pub use heuristic::{extractive_summary, mock_quiz, MOCK_SUMMARY};
pub use readability::flesch_reading_ease;
pub use router::{InferenceResult, InferenceRouter, Routed};
