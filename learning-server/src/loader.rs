//! Background model loader.
//!
//! Drives every registered capability through
//! `NotStarted -> Loading -> {Ready | Failed}` exactly once. The loader is
//! consumed by [`ModelLoader::spawn`], so one loader can only ever start one
//! load pass. The returned [`LoaderHandle`] can be dropped (detached mode) or
//! awaited before serving (preload mode).
//!
//! All capabilities enter `Loading` at the start of the pass and load side by
//! side, so a slow model never holds another one back.

use std::sync::Arc;
use std::time::Instant;

use learning_common::{Capability, LoadState};
use tokio::task::{JoinHandle, JoinSet};

use crate::engine::ModelEngine;
use crate::readiness::ReadinessRegistry;

/// Final state of every capability after a load pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub outcomes: Vec<(Capability, LoadState)>,
}

impl LoadReport {
    pub fn all_ready(&self) -> bool {
        self.outcomes.iter().all(|(_, s)| s.is_ready())
    }

    pub fn failed(&self) -> Vec<Capability> {
        self.outcomes
            .iter()
            .filter(|(_, s)| *s == LoadState::Failed)
            .map(|(c, _)| *c)
            .collect()
    }
}

/// Handle to a running load pass.
pub struct LoaderHandle {
    task: JoinHandle<LoadReport>,
    registry: Arc<ReadinessRegistry>,
}

impl LoaderHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the load pass to complete.
    pub async fn wait(self) -> LoadReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Model loader task ended abnormally: {}", e);
                current_report(&self.registry)
            }
        }
    }
}

/// Loads model capabilities into a [`ReadinessRegistry`].
pub struct ModelLoader {
    registry: Arc<ReadinessRegistry>,
    engine: Arc<dyn ModelEngine>,
}

impl ModelLoader {
    pub fn new(registry: Arc<ReadinessRegistry>, engine: Arc<dyn ModelEngine>) -> Self {
        Self { registry, engine }
    }

    /// Start the load pass on its own task.
    pub fn spawn(self) -> LoaderHandle {
        let registry = self.registry.clone();
        tracing::info!(
            engine = self.engine.engine_type(),
            "Starting background model loading"
        );
        let task = tokio::spawn(async move { self.run().await });
        LoaderHandle { task, registry }
    }

    /// Mark every capability `Loading`, then wait for all attempts. A failure
    /// of one capability does not affect the others.
    async fn run(self) -> LoadReport {
        let mut attempts = JoinSet::new();
        for capability in self.registry.capabilities() {
            if let Err(e) = self.registry.mark_loading(capability) {
                tracing::warn!("Skipping load of {}: {}", capability, e);
                continue;
            }
            attempts.spawn(load_capability(
                self.registry.clone(),
                self.engine.clone(),
                capability,
            ));
        }

        while let Some(joined) = attempts.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Model load task ended abnormally: {}", e);
            }
        }

        let report = current_report(&self.registry);
        tracing::info!(
            all_ready = report.all_ready(),
            failed = ?report.failed(),
            "Model loading finished"
        );
        report
    }
}

/// Run one load attempt for a capability already marked `Loading` and record
/// the outcome.
async fn load_capability(
    registry: Arc<ReadinessRegistry>,
    engine: Arc<dyn ModelEngine>,
    capability: Capability,
) {
    let model_name = registry.model_name(capability).unwrap_or_default();
    tracing::info!("Loading {} model {}", capability, model_name);
    let started = Instant::now();

    // The attempt runs on its own task so that a panicking engine still
    // ends in Failed instead of leaving the capability in Loading.
    let name = model_name.clone();
    let attempt = tokio::spawn(async move { engine.load(capability, &name).await }).await;

    let result = match attempt {
        Ok(Ok(handle)) => registry.mark_ready(capability, handle).map(|_| {
            tracing::info!(
                model = %model_name,
                elapsed_ms = %started.elapsed().as_millis(),
                "{} ready",
                capability
            );
        }),
        Ok(Err(e)) => {
            tracing::error!("{} failed to load model {}: {}", capability, model_name, e);
            registry.mark_failed(capability, e.to_string())
        }
        Err(e) => {
            tracing::error!("{} load task aborted: {}", capability, e);
            registry.mark_failed(capability, format!("load task aborted: {}", e))
        }
    };

    if let Err(e) = result {
        tracing::warn!("Could not record load result for {}: {}", capability, e);
    }
}

fn current_report(registry: &ReadinessRegistry) -> LoadReport {
    LoadReport {
        outcomes: registry
            .capabilities()
            .into_iter()
            .map(|c| (c, registry.get_state(c)))
            .collect(),
    }
}
