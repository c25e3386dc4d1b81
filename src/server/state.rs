//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::core::config::AssistantConfig;
use crate::core::errors::AssistantResult;
use crate::engine::rules::ResponseEngine;
use crate::store::ConversationStore;

/// Shared application state.
pub struct AppState {
    /// Conversation store.
    pub store: ConversationStore,
    /// Engine for stateless one-off answers.
    pub engine: ResponseEngine,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    /// Returns an error if the store cannot be built from `config`.
    pub fn new(config: &AssistantConfig) -> AssistantResult<Arc<Self>> {
        Ok(Self::with_store(
            ConversationStore::new(config)?,
            ResponseEngine::new(&config.engine),
        ))
    }

    /// Wrap an existing store.
    #[must_use]
    pub fn with_store(store: ConversationStore, engine: ResponseEngine) -> Arc<Self> {
        Arc::new(Self { store, engine })
    }
}
