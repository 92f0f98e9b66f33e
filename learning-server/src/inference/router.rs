//! Per-request execution path selection.
//!
//! Decision order, first match wins:
//! 1. `force_mock` → canned content (`mock`), registry not consulted
//! 2. no engine configured → heuristic
//! 3. capability not `Ready` → loading signal, never waits
//! 4. `Ready` → model on bounded input; an invocation error falls back to the
//!    heuristic, an unparseable quiz falls back to the mock quiz

use std::sync::Arc;

use learning_common::{Capability, LoadState, QuizQuestion, Source};

use super::extract::extract_questions;
use super::heuristic::{extractive_summary, mock_quiz, MOCK_SUMMARY};
use crate::engine::ModelHandle;
use crate::readiness::{Readiness, ReadinessRegistry};

/// A response payload together with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult<T> {
    pub payload: T,
    pub source: Source,
}

impl<T> InferenceResult<T> {
    fn new(payload: T, source: Source) -> Self {
        Self { payload, source }
    }
}

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed<T> {
    Completed(InferenceResult<T>),
    /// The capability is not ready; the caller should retry later.
    Loading(LoadState),
}

enum Path {
    Mock,
    Heuristic,
    Loading(LoadState),
    Model(Arc<dyn ModelHandle>),
}

/// Routes inference requests between models, heuristics and mocks.
pub struct InferenceRouter {
    registry: Arc<ReadinessRegistry>,
    engine_available: bool,
    max_input_chars: usize,
}

impl InferenceRouter {
    pub fn new(
        registry: Arc<ReadinessRegistry>,
        engine_available: bool,
        max_input_chars: usize,
    ) -> Self {
        Self {
            registry,
            engine_available,
            max_input_chars,
        }
    }

    pub fn registry(&self) -> &Arc<ReadinessRegistry> {
        &self.registry
    }

    pub fn engine_available(&self) -> bool {
        self.engine_available
    }

    fn select(&self, capability: Capability, force_mock: bool) -> Path {
        if force_mock {
            return Path::Mock;
        }
        if !self.engine_available {
            return Path::Heuristic;
        }
        match self.registry.readiness(capability) {
            Readiness::Ready(handle) => Path::Model(handle),
            Readiness::NotReady(state) => Path::Loading(state),
        }
    }

    pub async fn summarize(&self, text: &str, force_mock: bool) -> Routed<String> {
        let result = match self.select(Capability::Summarizer, force_mock) {
            Path::Mock => InferenceResult::new(MOCK_SUMMARY.to_string(), Source::Mock),
            Path::Heuristic => InferenceResult::new(extractive_summary(text), Source::Heuristic),
            Path::Loading(state) => return Routed::Loading(state),
            Path::Model(handle) => {
                let input = truncate_chars(text, self.max_input_chars);
                match handle.invoke(input).await {
                    Ok(summary) => InferenceResult::new(summary, Source::Model),
                    Err(e) => {
                        tracing::warn!(
                            model = handle.model_name(),
                            "Summarizer failed, using extractive summary: {}",
                            e
                        );
                        InferenceResult::new(extractive_summary(text), Source::Heuristic)
                    }
                }
            }
        };

        tracing::debug!(source = %result.source, "Summarize routed");
        Routed::Completed(result)
    }

    pub async fn generate_quiz(&self, text: &str, force_mock: bool) -> Routed<Vec<QuizQuestion>> {
        let result = match self.select(Capability::Generator, force_mock) {
            Path::Mock => InferenceResult::new(mock_quiz(), Source::Mock),
            // No heuristic quiz generator exists; the static quiz stands in and keeps the tag.
            Path::Heuristic => InferenceResult::new(mock_quiz(), Source::Heuristic),
            Path::Loading(state) => return Routed::Loading(state),
            Path::Model(handle) => {
                let input = truncate_chars(text, self.max_input_chars);
                match handle.invoke(input).await {
                    Ok(output) => match extract_questions(&output) {
                        Ok(questions) => InferenceResult::new(questions, Source::Model),
                        Err(e) => {
                            tracing::warn!(
                                model = handle.model_name(),
                                "Could not extract quiz from generator output, using mock quiz: {}",
                                e
                            );
                            InferenceResult::new(mock_quiz(), Source::Mock)
                        }
                    },
                    Err(e) => {
                        tracing::warn!(
                            model = handle.model_name(),
                            "Generator failed, using static quiz: {}",
                            e
                        );
                        InferenceResult::new(mock_quiz(), Source::Heuristic)
                    }
                }
            }
        };

        tracing::debug!(source = %result.source, "Quiz generation routed");
        Routed::Completed(result)
    }
}

/// The first `max_chars` characters of `text`, cut on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ScriptedHandle;

    fn registry() -> Arc<ReadinessRegistry> {
        Arc::new(ReadinessRegistry::new([
            (Capability::Summarizer, "sum-model"),
            (Capability::Generator, "gen-model"),
        ]))
    }

    fn make_ready(registry: &ReadinessRegistry, capability: Capability, handle: Arc<dyn ModelHandle>) {
        registry.mark_loading(capability).unwrap();
        registry.mark_ready(capability, handle).unwrap();
    }

    fn completed<T>(routed: Routed<T>) -> InferenceResult<T> {
        match routed {
            Routed::Completed(result) => result,
            Routed::Loading(state) => panic!("expected completion, got loading ({})", state),
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_force_mock_wins_over_every_state() {
        let registry = registry();
        let router = InferenceRouter::new(registry.clone(), true, 1000);

        // Not started.
        let result = completed(router.summarize("A. B. C.", true).await);
        assert_eq!(result.source, Source::Mock);
        assert_eq!(result.payload, MOCK_SUMMARY);
        assert_ne!(result.payload, "A. B.");

        // Ready.
        make_ready(&registry, Capability::Generator, ScriptedHandle::replying("[]"));
        let result = completed(router.generate_quiz("text", true).await);
        assert_eq!(result.source, Source::Mock);
        assert_eq!(result.payload, mock_quiz());

        // Unavailable engine.
        let router = InferenceRouter::new(registry, false, 1000);
        let result = completed(router.summarize("A. B. C.", true).await);
        assert_eq!(result.source, Source::Mock);
    }

    #[tokio::test]
    async fn test_unavailable_engine_uses_heuristic() {
        let router = InferenceRouter::new(registry(), false, 1000);

        let result = completed(router.summarize("A. B. C.", false).await);
        assert_eq!(result.source, Source::Heuristic);
        assert_eq!(result.payload, "A. B.");

        let result = completed(router.generate_quiz("text", false).await);
        assert_eq!(result.source, Source::Heuristic);
        assert_eq!(result.payload, mock_quiz());
    }

    #[tokio::test]
    async fn test_not_ready_signals_loading() {
        let registry = registry();
        let router = InferenceRouter::new(registry.clone(), true, 1000);

        assert_eq!(
            router.summarize("text", false).await,
            Routed::Loading(LoadState::NotStarted)
        );

        registry.mark_loading(Capability::Summarizer).unwrap();
        assert_eq!(
            router.summarize("text", false).await,
            Routed::Loading(LoadState::Loading)
        );

        registry.mark_failed(Capability::Summarizer, "boom").unwrap();
        assert_eq!(
            router.summarize("text", false).await,
            Routed::Loading(LoadState::Failed)
        );

        assert_eq!(
            router.generate_quiz("text", false).await,
            Routed::Loading(LoadState::NotStarted)
        );
    }

    #[tokio::test]
    async fn test_ready_summarizer_gets_truncated_input() {
        let registry = registry();
        let handle = Arc::new(ScriptedHandle::new(Ok("model summary".to_string())));
        make_ready(&registry, Capability::Summarizer, handle.clone());
        let router = InferenceRouter::new(registry, true, 1000);

        let text = "w".repeat(1500);
        let result = completed(router.summarize(&text, false).await);
        assert_eq!(result.source, Source::Model);
        assert_eq!(result.payload, "model summary");
        assert_eq!(handle.inputs(), vec!["w".repeat(1000)]);
    }

    #[tokio::test]
    async fn test_summarizer_failure_falls_back_to_heuristic() {
        let registry = registry();
        make_ready(&registry, Capability::Summarizer, ScriptedHandle::failing("cuda error"));
        let router = InferenceRouter::new(registry, true, 1000);

        let result = completed(router.summarize("One. Two. Three.", false).await);
        assert_eq!(result.source, Source::Heuristic);
        assert_eq!(result.payload, "One. Two.");
    }

    #[tokio::test]
    async fn test_generator_output_is_extracted() {
        let registry = registry();
        make_ready(
            &registry,
            Capability::Generator,
            ScriptedHandle::replying(r#"Sure! [{"question": "Q1", "options": ["a", "b"], "answer": "a"}]"#),
        );
        let router = InferenceRouter::new(registry, true, 1000);

        let result = completed(router.generate_quiz("text", false).await);
        assert_eq!(result.source, Source::Model);
        assert_eq!(result.payload.len(), 1);
        assert_eq!(result.payload[0].question, "Q1");
    }

    #[tokio::test]
    async fn test_unparseable_generator_output_falls_back_to_mock() {
        let registry = registry();
        make_ready(&registry, Capability::Generator, ScriptedHandle::replying("no json here"));
        let router = InferenceRouter::new(registry, true, 1000);

        let result = completed(router.generate_quiz("text", false).await);
        assert_eq!(result.source, Source::Mock);
        assert_eq!(result.payload, mock_quiz());
    }

    #[tokio::test]
    async fn test_generator_failure_falls_back_to_static_quiz() {
        let registry = registry();
        make_ready(&registry, Capability::Generator, ScriptedHandle::failing("timeout"));
        let router = InferenceRouter::new(registry, true, 1000);

        let result = completed(router.generate_quiz("text", false).await);
        assert_eq!(result.source, Source::Heuristic);
        assert_eq!(result.payload, mock_quiz());
    }
}
