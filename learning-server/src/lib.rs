//! Learning platform backend.
//!
//! Serves summaries, quizzes and chunked reading material for lecture
//! transcripts. Models load in the background; until a capability is ready,
//! requests are answered by heuristics or told to retry.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod inference;
pub mod loader;
pub mod logging;
pub mod monitor;
pub mod readiness;
pub mod state;
pub mod store;
pub mod test_util;
pub mod transcript;

pub use config::{Config, LoadMode};
pub use error::{Error, Result};
pub use loader::{LoadReport, LoaderHandle, ModelLoader};
pub use readiness::{Readiness, ReadinessRegistry};
pub use state::AppState;
pub use store::LearningStore;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

/// Build the full HTTP application for `state`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api::router())
        .layer(axum::middleware::from_fn(logging::request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
