//! Deterministic fallbacks used when no model output is available.

use learning_common::QuizQuestion;

/// Character budget for the single-sentence summary fallback.
const SUMMARY_PREVIEW_CHARS: usize = 200;

/// Returned for `force_mock` summarize requests.
pub const MOCK_SUMMARY: &str = "This is a mock summary of the lecture. \
    It highlights the key concepts covered in the transcript.";

/// Extractive summary: the first two sentences, or a 200-character preview.
pub fn extractive_summary(text: &str) -> String {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() >= 2 {
        return format!("{}. {}.", sentences[0], sentences[1]);
    }

    match text.char_indices().nth(SUMMARY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// The fixed two-question quiz, independent of the input text.
pub fn mock_quiz() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion {
            question: "What is the main goal of supervised learning?".to_string(),
            options: vec![
                "Predict labels for new data".to_string(),
                "Group unlabeled data into clusters".to_string(),
                "Reduce the number of features".to_string(),
                "Generate random samples".to_string(),
            ],
            answer: Some("Predict labels for new data".to_string()),
        },
        QuizQuestion {
            question: "Which of these is an example of unsupervised learning?".to_string(),
            options: vec![
                "K-means clustering".to_string(),
                "Linear regression".to_string(),
                "Logistic regression".to_string(),
                "Decision tree classification".to_string(),
            ],
            answer: Some("K-means clustering".to_string()),
        },
    ]
}
