//! Shared application state.

use std::sync::Arc;

use learning_common::Capability;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::inference::InferenceRouter;
use crate::readiness::ReadinessRegistry;
use crate::store::LearningStore;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ReadinessRegistry>,
    pub router: InferenceRouter,
    /// `None` when the database could not be opened at startup.
    pub store: Option<Arc<LearningStore>>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<ReadinessRegistry>,
        store: Option<Arc<LearningStore>>,
    ) -> Self {
        let router = InferenceRouter::new(
            registry.clone(),
            config.engine_available(),
            config.models.max_input_chars,
        );
        Self {
            config,
            registry,
            router,
            store,
        }
    }

    pub fn store(&self) -> Result<&LearningStore> {
        self.store.as_deref().ok_or(Error::StorageUnavailable)
    }
}

/// A registry with one record per capability, named from config.
pub fn registry_from_config(config: &Config) -> ReadinessRegistry {
    ReadinessRegistry::new([
        (Capability::Summarizer, config.models.summarizer_model.clone()),
        (Capability::Generator, config.models.generator_model.clone()),
    ])
}
