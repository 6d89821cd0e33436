//! Shared application state and the session domain model.

/// Store paths of the session subtree.
pub mod paths;
/// Session, player, answer and item documents.
pub mod session;
/// Pure phase transition function.
pub mod state_machine;

use std::sync::Arc;

use crate::{config::AppConfig, store::SessionStore};

/// Cheaply clonable handle to the shared application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the store handle and immutable configuration.
pub struct AppState {
    store: Arc<dyn SessionStore>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn SessionStore>, config: AppConfig) -> SharedState {
        Arc::new(Self { store, config })
    }

    /// Handle to the session store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
