//! Readiness registry: per-capability load state shared by the loader and
//! request handlers.
//!
//! The background loader is the only writer. Request handlers read the
//! current state and branch immediately; no read ever waits for a load to
//! finish. Lock guards are never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use learning_common::{Capability, LoadState};

use crate::engine::ModelHandle;

/// Load slot of one capability. The handle only exists inside `Ready`.
#[derive(Clone)]
enum Slot {
    NotStarted,
    Loading,
    Ready(Arc<dyn ModelHandle>),
    Failed(String),
}

impl Slot {
    fn state(&self) -> LoadState {
        match self {
            Slot::NotStarted => LoadState::NotStarted,
            Slot::Loading => LoadState::Loading,
            Slot::Ready(_) => LoadState::Ready,
            Slot::Failed(_) => LoadState::Failed,
        }
    }
}

struct CapabilityRecord {
    model_name: String,
    slot: Slot,
}

/// What a request handler sees when it asks for a capability.
#[derive(Clone)]
pub enum Readiness {
    Ready(Arc<dyn ModelHandle>),
    NotReady(LoadState),
}

/// Point-in-time view of one capability, for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitySnapshot {
    pub capability: Capability,
    pub model_name: String,
    pub state: LoadState,
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(Capability),

    #[error("Invalid transition for {capability}: {from} -> {to}")]
    InvalidTransition {
        capability: Capability,
        from: LoadState,
        to: LoadState,
    },
}

/// Registry of capability readiness.
pub struct ReadinessRegistry {
    records: RwLock<HashMap<Capability, CapabilityRecord>>,
    /// Registration order; fixed at construction.
    order: Vec<Capability>,
}

impl ReadinessRegistry {
    /// Create a registry with one `NotStarted` record per capability.
    pub fn new<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = (Capability, S)>,
        S: Into<String>,
    {
        let mut records = HashMap::new();
        let mut order = Vec::new();
        for (capability, model_name) in capabilities {
            if !order.contains(&capability) {
                order.push(capability);
            }
            records.insert(
                capability,
                CapabilityRecord {
                    model_name: model_name.into(),
                    slot: Slot::NotStarted,
                },
            );
        }

        Self {
            records: RwLock::new(records),
            order,
        }
    }

    /// Latest known state. Unregistered capabilities report `NotStarted`.
    pub fn get_state(&self, capability: Capability) -> LoadState {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .get(&capability)
            .map(|r| r.slot.state())
            .unwrap_or(LoadState::NotStarted)
    }

    /// State and handle read together, so a caller never sees `Ready`
    /// without the handle that goes with it.
    pub fn readiness(&self, capability: Capability) -> Readiness {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        match records.get(&capability).map(|r| &r.slot) {
            Some(Slot::Ready(handle)) => Readiness::Ready(handle.clone()),
            Some(slot) => Readiness::NotReady(slot.state()),
            None => Readiness::NotReady(LoadState::NotStarted),
        }
    }

    pub fn handle(&self, capability: Capability) -> Option<Arc<dyn ModelHandle>> {
        match self.readiness(capability) {
            Readiness::Ready(handle) => Some(handle),
            Readiness::NotReady(_) => None,
        }
    }

    pub fn model_name(&self, capability: Capability) -> Option<String> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(&capability).map(|r| r.model_name.clone())
    }

    /// Registered capabilities, in registration order.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.order.clone()
    }

    pub fn snapshot(&self, capability: Capability) -> Option<CapabilitySnapshot> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(&capability).map(|r| CapabilitySnapshot {
            capability,
            model_name: r.model_name.clone(),
            state: r.slot.state(),
            error: match &r.slot {
                Slot::Failed(e) => Some(e.clone()),
                _ => None,
            },
        })
    }

    /// `NotStarted -> Loading`.
    pub fn mark_loading(&self, capability: Capability) -> Result<(), RegistryError> {
        self.transition(capability, LoadState::NotStarted, Slot::Loading)
    }

    /// `Loading -> Ready`, installing the handle in the same write.
    pub fn mark_ready(
        &self,
        capability: Capability,
        handle: Arc<dyn ModelHandle>,
    ) -> Result<(), RegistryError> {
        self.transition(capability, LoadState::Loading, Slot::Ready(handle))
    }

    /// `Loading -> Failed`.
    pub fn mark_failed(
        &self,
        capability: Capability,
        error: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.transition(capability, LoadState::Loading, Slot::Failed(error.into()))
    }

    fn transition(
        &self,
        capability: Capability,
        expected: LoadState,
        next: Slot,
    ) -> Result<(), RegistryError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .get_mut(&capability)
            .ok_or(RegistryError::UnknownCapability(capability))?;

        let current = record.slot.state();
        if current != expected {
            return Err(RegistryError::InvalidTransition {
                capability,
                from: current,
                to: next.state(),
            });
        }

        record.slot = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ScriptedHandle;

    fn registry() -> ReadinessRegistry {
        ReadinessRegistry::new([
            (Capability::Summarizer, "sum-model"),
            (Capability::Generator, "gen-model"),
        ])
    }

    #[test]
    fn test_initial_state_is_not_started() {
        let registry = registry();
        for cap in Capability::ALL {
            assert_eq!(registry.get_state(cap), LoadState::NotStarted);
            assert!(registry.handle(cap).is_none());
        }
        assert_eq!(registry.model_name(Capability::Generator).as_deref(), Some("gen-model"));
    }

    #[test]
    fn test_ready_installs_handle() {
        let registry = registry();
        registry.mark_loading(Capability::Summarizer).unwrap();
        assert_eq!(registry.get_state(Capability::Summarizer), LoadState::Loading);
        assert!(registry.handle(Capability::Summarizer).is_none());

        registry
            .mark_ready(Capability::Summarizer, ScriptedHandle::replying("ok"))
            .unwrap();
        assert_eq!(registry.get_state(Capability::Summarizer), LoadState::Ready);
        assert!(registry.handle(Capability::Summarizer).is_some());
        assert!(matches!(
            registry.readiness(Capability::Summarizer),
            Readiness::Ready(_)
        ));

        // Other capability untouched.
        assert_eq!(registry.get_state(Capability::Generator), LoadState::NotStarted);
    }

    #[test]
    fn test_failed_has_no_handle_and_keeps_error() {
        let registry = registry();
        registry.mark_loading(Capability::Generator).unwrap();
        registry.mark_failed(Capability::Generator, "out of memory").unwrap();

        assert_eq!(registry.get_state(Capability::Generator), LoadState::Failed);
        assert!(registry.handle(Capability::Generator).is_none());

        let snapshot = registry.snapshot(Capability::Generator).unwrap();
        assert_eq!(snapshot.state, LoadState::Failed);
        assert_eq!(snapshot.error.as_deref(), Some("out of memory"));
        assert_eq!(snapshot.model_name, "gen-model");
    }

    #[test]
    fn test_state_never_regresses() {
        let registry = registry();

        // Ready requires Loading first.
        let err = registry
            .mark_ready(Capability::Summarizer, ScriptedHandle::replying("x"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidTransition {
                capability: Capability::Summarizer,
                from: LoadState::NotStarted,
                to: LoadState::Ready,
            }
        );

        registry.mark_loading(Capability::Summarizer).unwrap();
        registry
            .mark_ready(Capability::Summarizer, ScriptedHandle::replying("x"))
            .unwrap();

        assert!(registry.mark_loading(Capability::Summarizer).is_err());
        assert!(registry.mark_failed(Capability::Summarizer, "late").is_err());
        assert_eq!(registry.get_state(Capability::Summarizer), LoadState::Ready);
    }

    #[test]
    fn test_failed_is_terminal() {
        let registry = registry();
        registry.mark_loading(Capability::Generator).unwrap();
        registry.mark_failed(Capability::Generator, "boom").unwrap();

        assert!(registry.mark_loading(Capability::Generator).is_err());
        assert!(registry
            .mark_ready(Capability::Generator, ScriptedHandle::replying("x"))
            .is_err());
        assert_eq!(registry.get_state(Capability::Generator), LoadState::Failed);
    }

    #[test]
    fn test_unknown_capability() {
        let registry = ReadinessRegistry::new([(Capability::Summarizer, "only")]);
        assert_eq!(registry.get_state(Capability::Generator), LoadState::NotStarted);
        assert_eq!(
            registry.mark_loading(Capability::Generator),
            Err(RegistryError::UnknownCapability(Capability::Generator))
        );
        assert_eq!(registry.capabilities(), vec![Capability::Summarizer]);
    }

    #[test]
    fn test_capabilities_keep_registration_order() {
        assert_eq!(
            registry().capabilities(),
            vec![Capability::Summarizer, Capability::Generator]
        );
    }

    #[test]
    fn test_concurrent_readers_see_consistent_state() {
        let registry = Arc::new(registry());
        registry.mark_loading(Capability::Summarizer).unwrap();

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        match registry.readiness(Capability::Summarizer) {
                            Readiness::Ready(handle) => {
                                assert_eq!(handle.model_name(), "scripted")
                            }
                            Readiness::NotReady(state) => assert_eq!(state, LoadState::Loading),
                        }
                    }
                })
            })
            .collect();

        registry
            .mark_ready(Capability::Summarizer, ScriptedHandle::replying("x"))
            .unwrap();

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(registry.get_state(Capability::Summarizer), LoadState::Ready);
    }
}
