//! Model readiness status endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use learning_common::{Capability, LoadState, ModelsStatus};

use crate::state::AppState;

/// Build the models router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/models/status", get(models_status))
}

/// GET /models/status - snapshot of the readiness registry.
async fn models_status(State(state): State<Arc<AppState>>) -> Json<ModelsStatus> {
    Json(collect_status(&state))
}

pub fn collect_status(state: &AppState) -> ModelsStatus {
    let summarizer = state.registry.snapshot(Capability::Summarizer);
    let generator = state.registry.snapshot(Capability::Generator);

    let state_of = |s: &Option<crate::readiness::CapabilitySnapshot>| {
        s.as_ref().map(|s| s.state).unwrap_or(LoadState::NotStarted)
    };
    let summarizer_state = state_of(&summarizer);
    let generator_state = state_of(&generator);

    ModelsStatus {
        available: state.router.engine_available(),
        summarizer_ready: summarizer_state.is_ready(),
        generator_ready: generator_state.is_ready(),
        background_loading_enabled: state.config.models.load_mode.is_enabled(),
        summarizer_model: state.config.models.summarizer_model.clone(),
        generator_model: state.config.models.generator_model.clone(),
        summarizer_state,
        generator_state,
        summarizer_error: summarizer.and_then(|s| s.error),
        generator_error: generator.and_then(|s| s.error),
    }
}
