//! Application state shared across handlers.

use std::sync::Arc;

use crate::completion::CompletionProvider;
use crate::persona::PersonaRegistry;
use crate::registry::SessionRegistry;
use crate::relay::RelayEngine;
use crate::store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Durable session/message storage.
    pub store: Arc<dyn Store>,
    /// Live channel registry.
    pub registry: Arc<SessionRegistry>,
    /// Relay engine driving the message state machine.
    pub engine: Arc<RelayEngine>,
    /// Available personas.
    pub personas: Arc<PersonaRegistry>,
}

impl AppState {
    /// Wire up application state from its external collaborators.
    pub fn new(store: Arc<dyn Store>, completion: Arc<dyn CompletionProvider>) -> Self {
        let personas = Arc::new(PersonaRegistry::builtin());
        let registry = Arc::new(SessionRegistry::new(store.clone()));
        let engine = Arc::new(RelayEngine::new(
            store.clone(),
            registry.clone(),
            personas.clone(),
            completion,
        ));

        Self {
            store,
            registry,
            engine,
            personas,
        }
    }
}
