//! Integration tests for the learning-server HTTP API.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use learning_common::Capability;
use learning_server::config::{Config, OllamaEngineConfig};
use learning_server::engine::ModelHandle;
use learning_server::inference::{mock_quiz, MOCK_SUMMARY};
use learning_server::state::{registry_from_config, AppState};
use learning_server::test_util::{ScriptedEngine, ScriptedHandle};
use learning_server::{app, LearningStore, ModelLoader, ReadinessRegistry};
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tower::ServiceExt;

struct TestApp {
    registry: Arc<ReadinessRegistry>,
    router: Router,
}

impl TestApp {
    fn new(engine_enabled: bool, with_store: bool) -> Self {
        let mut config = Config::default();
        if engine_enabled {
            config.models.ollama = Some(OllamaEngineConfig::default());
        }
        let registry = Arc::new(registry_from_config(&config));
        let store = with_store.then(|| Arc::new(LearningStore::open(":memory:").unwrap()));
        let state = Arc::new(AppState::new(config, registry.clone(), store));
        Self {
            registry,
            router: app(state),
        }
    }

    /// Engine configured, models not loaded, in-memory store.
    fn default_app() -> Self {
        Self::new(true, true)
    }

    fn make_ready(&self, capability: Capability, handle: Arc<dyn ModelHandle>) {
        self.registry.mark_loading(capability).unwrap();
        self.registry.mark_ready(capability, handle).unwrap();
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

// ============================================================================
// Health & status
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::default_app();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_models_status_tracks_registry() {
    let app = TestApp::default_app();

    let (status, body) = app.get("/models/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["summarizer_ready"], false);
    assert_eq!(body["generator_ready"], false);
    assert_eq!(body["background_loading_enabled"], false);
    assert_eq!(body["summarizer_model"], "llama3.2:1b");
    assert_eq!(body["summarizer_state"], "not_started");

    app.make_ready(Capability::Summarizer, ScriptedHandle::replying("ok"));
    app.registry.mark_loading(Capability::Generator).unwrap();
    app.registry
        .mark_failed(Capability::Generator, "out of memory")
        .unwrap();

    let (_, body) = app.get("/models/status").await;
    assert_eq!(body["summarizer_ready"], true);
    assert_eq!(body["summarizer_state"], "ready");
    assert_eq!(body["generator_ready"], false);
    assert_eq!(body["generator_state"], "failed");
    assert_eq!(body["generator_error"], "out of memory");
    assert!(body.get("summarizer_error").is_none());
}

#[tokio::test]
async fn test_models_status_without_engine() {
    let app = TestApp::new(false, false);
    let (status, body) = app.get("/models/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
}

// ============================================================================
// Background loading
// ============================================================================

#[tokio::test]
async fn test_requests_follow_background_load() {
    let app = TestApp::default_app();
    let gate = Arc::new(Semaphore::new(0));
    let engine = Arc::new(
        ScriptedEngine::new()
            .ready(Capability::Summarizer, "Loaded summary.")
            .invoke_fails(Capability::Generator, "generator crashed")
            .gated(gate.clone()),
    );

    let loader = ModelLoader::new(app.registry.clone(), engine.clone()).spawn();

    // Held at the gate: requests are answered immediately with 202.
    let (status, body) = app.post("/summarize", json!({ "text": "One. Two. Three." })).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["source"], "loading");

    gate.add_permits(2);
    assert!(loader.wait().await.all_ready());

    let (_, body) = app.get("/models/status").await;
    assert_eq!(body["summarizer_ready"], true);
    assert_eq!(body["generator_ready"], true);

    let (status, body) = app.post("/summarize", json!({ "text": "One. Two. Three." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "huggingface");
    assert_eq!(body["summary"], "Loaded summary.");

    // A loaded generator that fails per request degrades to the static quiz.
    let (status, body) = app.post("/generate-quiz", json!({ "text": "Lecture." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "heuristic");
    assert_eq!(engine.handle(Capability::Generator).unwrap().calls(), 1);
}

// ============================================================================
// Summarize
// ============================================================================

#[tokio::test]
async fn test_summarize_requires_text() {
    let app = TestApp::default_app();

    for body in [json!({}), json!({ "text": "" }), json!({ "text": "   " })] {
        let (status, body) = app.post("/summarize", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No text provided");
    }
}

#[tokio::test]
async fn test_summarize_malformed_body_is_json_error() {
    let app = TestApp::default_app();
    let request = Request::builder()
        .method("POST")
        .uri("/summarize")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_summarize_force_mock_wins() {
    let app = TestApp::default_app();
    app.make_ready(Capability::Summarizer, ScriptedHandle::replying("model summary"));

    let (status, body) = app
        .post("/summarize", json!({ "text": "A. B. C.", "force_mock": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "mock");
    assert_eq!(body["summary"], MOCK_SUMMARY);
    assert_ne!(body["summary"], "A. B.");
}

#[tokio::test]
async fn test_summarize_while_loading_returns_202() {
    let app = TestApp::default_app();
    app.registry.mark_loading(Capability::Summarizer).unwrap();

    let (status, body) = app.post("/summarize", json!({ "text": "A. B. C." })).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["source"], "loading");
    assert!(body["message"].is_string());
    assert!(body.get("summary").is_none());
}

#[tokio::test]
async fn test_summarize_not_started_returns_202() {
    let app = TestApp::default_app();
    let (status, body) = app.post("/summarize", json!({ "text": "A. B." })).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["source"], "loading");
}

#[tokio::test]
async fn test_summarize_without_engine_uses_heuristic() {
    let app = TestApp::new(false, false);

    let (status, body) = app
        .post("/summarize", json!({ "text": "First point. Second point. Third point." }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "heuristic");
    assert_eq!(body["summary"], "First point. Second point.");
}

#[tokio::test]
async fn test_summarize_accepts_transcript_field() {
    let app = TestApp::new(false, false);
    let (status, body) = app
        .post("/summarize", json!({ "transcript": "One. Two. Three." }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "One. Two.");
}

#[tokio::test]
async fn test_summarize_with_ready_model() {
    let app = TestApp::default_app();
    let handle = Arc::new(ScriptedHandle::new(Ok("A model summary.".to_string())));
    app.make_ready(Capability::Summarizer, handle.clone());

    let text = "x".repeat(2500);
    let (status, body) = app.post("/summarize", json!({ "text": text })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "huggingface");
    assert_eq!(body["summary"], "A model summary.");
    assert_eq!(handle.inputs(), vec!["x".repeat(1000)]);
}

#[tokio::test]
async fn test_summarize_model_failure_falls_back() {
    let app = TestApp::default_app();
    app.make_ready(Capability::Summarizer, ScriptedHandle::failing("model crashed"));

    let (status, body) = app.post("/summarize", json!({ "text": "One. Two. Three." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "heuristic");
    assert_eq!(body["summary"], "One. Two.");
}

// ============================================================================
// Quiz
// ============================================================================

#[tokio::test]
async fn test_generate_quiz_requires_text() {
    let app = TestApp::default_app();
    let (status, body) = app.post("/generate-quiz", json!({ "force_mock": true })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_generate_quiz_force_mock() {
    let app = TestApp::default_app();
    let (status, body) = app
        .post("/generate-quiz", json!({ "text": "Lecture.", "force_mock": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "mock");
    assert_eq!(body["questions"], serde_json::to_value(mock_quiz()).unwrap());
}

#[tokio::test]
async fn test_generate_quiz_while_loading_returns_202() {
    let app = TestApp::default_app();
    app.registry.mark_loading(Capability::Generator).unwrap();

    let (status, body) = app.post("/generate-quiz", json!({ "text": "Lecture." })).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["source"], "loading");
    assert!(body.get("questions").is_none());
}

#[tokio::test]
async fn test_generate_quiz_extracts_model_output() {
    let app = TestApp::default_app();
    app.make_ready(
        Capability::Generator,
        ScriptedHandle::replying(
            r#"Here you go: [{"question": "What is 2+2?", "options": ["3", "4"], "answer": "4"}] Enjoy!"#,
        ),
    );

    let (status, body) = app.post("/generate-quiz", json!({ "text": "Arithmetic." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "huggingface");
    assert_eq!(body["questions"][0]["question"], "What is 2+2?");
    assert_eq!(body["questions"][0]["answer"], "4");
}

#[tokio::test]
async fn test_generate_quiz_unparseable_output_falls_back_to_mock() {
    let app = TestApp::default_app();
    app.make_ready(Capability::Generator, ScriptedHandle::replying("I cannot do that."));

    let (status, body) = app.post("/generate-quiz", json!({ "text": "Lecture." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "mock");
    assert_eq!(body["questions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stored_quiz_after_seed() {
    let app = TestApp::default_app();

    let (status, body) = app.get("/generate-quiz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 0);

    let (status, body) = app.post("/seed-db", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let inserted = body["questions_inserted"].as_u64().unwrap();
    assert!(inserted > 0);

    // Seeding again inserts nothing new.
    let (_, body) = app.post("/seed-db", json!({})).await;
    assert_eq!(body["questions_inserted"], 0);

    let (_, body) = app.get("/generate-quiz").await;
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len() as u64, inserted);
    assert!(questions[0]["options"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_seed_questions_get_alias() {
    let app = TestApp::default_app();

    let (status, body) = app.get("/seed-questions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Database seeded");
    assert!(body["questions_inserted"].as_u64().unwrap() > 0);

    // Shares the seed set with POST /seed-db.
    let (_, body) = app.post("/seed-db", json!({})).await;
    assert_eq!(body["questions_inserted"], 0);
}

// ============================================================================
// Cognitive load
// ============================================================================

#[tokio::test]
async fn test_cognitive_load_chunks_text() {
    let app = TestApp::default_app();
    let (status, body) = app
        .post(
            "/cognitive-load",
            json!({ "text": "one two three four five six", "max_chunk_chars": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let chunks: Vec<String> = serde_json::from_value(body["chunks"].clone()).unwrap();
    assert_eq!(chunks.join(" "), "one two three four five six");
    assert!(chunks.len() > 1);
    assert!(body["readability_flesch"].is_number());
}

#[tokio::test]
async fn test_cognitive_load_uses_default_budget() {
    let app = TestApp::default_app();
    let (status, body) = app
        .post("/cognitive-load", json!({ "text": "Short text." }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], json!(["Short text."]));
}

#[tokio::test]
async fn test_cognitive_load_rejects_bad_input() {
    let app = TestApp::default_app();

    let (status, _) = app.post("/cognitive-load", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/cognitive-load", json!({ "text": "words", "max_chunk_chars": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Lectures, progress and storage
// ============================================================================

#[tokio::test]
async fn test_fetch_transcript() {
    let app = TestApp::default_app();
    let (status, body) = app
        .post(
            "/fetch-transcript",
            json!({ "url": "https://www.youtube.com/watch?v=znF2U_3Z210" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_id"], "znF2U_3Z210");
    assert_eq!(body["source"], "mock");
    assert!(!body["transcript"].as_str().unwrap().is_empty());

    let (status, _) = app.post("/fetch-transcript", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_and_list_lectures() {
    let app = TestApp::default_app();

    let (status, _) = app.post("/save-lecture", json!({ "summary": "no title" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/save-lecture", json!({ "title": "Intro to ML", "summary": "Basics." }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let first_id = body["id"].as_i64().unwrap();

    app.post("/save-lecture", json!({ "title": "Neural Networks" })).await;

    let (status, body) = app.get("/my-lectures").await;
    assert_eq!(status, StatusCode::OK);
    let lectures = body["lectures"].as_array().unwrap();
    assert_eq!(lectures.len(), 2);
    assert_eq!(lectures[0]["title"], "Neural Networks");
    assert_eq!(lectures[1]["id"].as_i64().unwrap(), first_id);
    assert_eq!(lectures[1]["summary"], "Basics.");
}

#[tokio::test]
async fn test_progress_and_performance() {
    let app = TestApp::default_app();

    let (status, _) = app
        .post("/save-progress", json!({ "mastery": 50, "engagement": 50, "accuracy": 50 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/save-progress",
            json!({ "user_id": 1, "mastery": 150, "engagement": 50, "accuracy": 50 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for (mastery, engagement, accuracy) in [(80, 60, 70), (60, 40, 90)] {
        let (status, _) = app
            .post(
                "/save-progress",
                json!({
                    "user_id": 1,
                    "week": "2024-W10",
                    "mastery": mastery,
                    "engagement": engagement,
                    "accuracy": accuracy,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/analyze-performance").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], 2);
    assert_eq!(body["average_mastery"], 70.0);
    assert_eq!(body["average_engagement"], 50.0);
    assert_eq!(body["weakest_area"], "engagement");
}

#[tokio::test]
async fn test_init_db_is_idempotent() {
    let app = TestApp::default_app();
    for _ in 0..2 {
        let (status, body) = app.post("/init-db", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_storage_endpoints_without_store() {
    let app = TestApp::new(true, false);

    let (status, body) = app.get("/my-lectures").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());

    let (status, _) = app.post("/seed-db", json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Inference endpoints keep working.
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post("/cognitive-load", json!({ "text": "Still fine." }))
        .await;
    assert_eq!(status, StatusCode::OK);
}
