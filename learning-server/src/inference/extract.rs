//! Recover a JSON array of quiz questions from free-form model output.

use learning_common::QuizQuestion;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON array found in model output")]
    NoArray,

    #[error("malformed JSON array: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the span from the first `[` to the last `]` as a question array.
///
/// Only that one candidate is tried, and it is accepted whole or not at all.
pub fn extract_questions(output: &str) -> Result<Vec<QuizQuestion>, ExtractError> {
    let candidate = match (output.find('['), output.rfind(']')) {
        (Some(start), Some(end)) if end > start => &output[start..=end],
        _ => return Err(ExtractError::NoArray),
    };

    Ok(serde_json::from_str(candidate)?)
}
