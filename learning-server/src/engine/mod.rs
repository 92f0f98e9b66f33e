//! Model engine abstraction layer.
//!
//! A `ModelEngine` knows how to bring a capability's model up (`load`), which
//! may take arbitrarily long. A successful load yields a `ModelHandle`, the
//! opaque callable the inference router invokes per request.

mod ollama;

pub use ollama::{OllamaEngine, OllamaHandle};

use std::sync::Arc;

use async_trait::async_trait;
use learning_common::Capability;

use crate::error::Result;

/// Result of one load attempt: a ready handle or the reason it failed.
pub type LoadOutcome = Result<Arc<dyn ModelHandle>>;

/// Provider of model capabilities.
#[async_trait]
pub trait ModelEngine: Send + Sync {
    /// Unique identifier for this engine type (e.g., "ollama").
    fn engine_type(&self) -> &'static str;

    /// Bring `model_name` up for `capability`.
    ///
    /// Runs on the background loader, never on a request path, so it may block
    /// for as long as a download or warm-up takes.
    async fn load(&self, capability: Capability, model_name: &str) -> LoadOutcome;
}

/// A loaded model, ready for inference.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    fn model_name(&self) -> &str;

    /// Run the model on `input` and return its raw text output.
    async fn invoke(&self, input: &str) -> Result<String>;
}

impl std::fmt::Debug for dyn ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model_name", &self.model_name())
            .finish()
    }
}
