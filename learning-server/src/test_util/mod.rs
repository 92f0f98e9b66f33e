//! Scripted model engines for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use learning_common::Capability;
use tokio::sync::Semaphore;

use crate::engine::{LoadOutcome, ModelEngine, ModelHandle};
use crate::error::{Error, Result};

/// A model handle that returns a fixed reply or a fixed error.
pub struct ScriptedHandle {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    inputs: std::sync::Mutex<Vec<String>>,
}

impl ScriptedHandle {
    pub fn new(reply: std::result::Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            inputs: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Arc<dyn ModelHandle> {
        Arc::new(Self::new(Ok(reply.to_string())))
    }

    pub fn failing(message: &str) -> Arc<dyn ModelHandle> {
        Arc::new(Self::new(Err(message.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inputs received so far, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelHandle for ScriptedHandle {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input.to_string());
        }
        self.reply
            .clone()
            .map_err(Error::InferenceFailed)
    }
}

/// A model engine whose load results are set up per capability.
///
/// Capabilities without a script fail to load. With a gate installed, every
/// load waits for one gate permit before finishing, which lets tests observe
/// the `Loading` state.
#[derive(Default)]
pub struct ScriptedEngine {
    handles: HashMap<Capability, Arc<ScriptedHandle>>,
    load_errors: HashMap<Capability, String>,
    gate: Option<Arc<Semaphore>>,
    loads: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load succeeds; the handle replies with `reply`.
    pub fn ready(mut self, capability: Capability, reply: &str) -> Self {
        self.handles.insert(
            capability,
            Arc::new(ScriptedHandle::new(Ok(reply.to_string()))),
        );
        self
    }

    /// Load succeeds; every invocation fails with `message`.
    pub fn invoke_fails(mut self, capability: Capability, message: &str) -> Self {
        self.handles.insert(
            capability,
            Arc::new(ScriptedHandle::new(Err(message.to_string()))),
        );
        self
    }

    /// Load fails with `message`.
    pub fn load_fails(mut self, capability: Capability, message: &str) -> Self {
        self.load_errors.insert(capability, message.to_string());
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn handle(&self, capability: Capability) -> Option<Arc<ScriptedHandle>> {
        self.handles.get(&capability).cloned()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelEngine for ScriptedEngine {
    fn engine_type(&self) -> &'static str {
        "scripted"
    }

    async fn load(&self, capability: Capability, model_name: &str) -> LoadOutcome {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| Error::Internal(e.to_string()))?
                .forget();
        }

        if let Some(message) = self.load_errors.get(&capability) {
            return Err(Error::LoadFailed(format!("{}: {}", model_name, message)));
        }

        match self.handles.get(&capability) {
            Some(handle) => Ok(handle.clone() as Arc<dyn ModelHandle>),
            None => Err(Error::ModelNotFound(model_name.to_string())),
        }
    }
}
