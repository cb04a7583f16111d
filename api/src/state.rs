//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::storage::{InMemoryUserStore, UserStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The user storage backend.
    user_store: Arc<dyn UserStore>,
    /// Application name shown by the root endpoint.
    app_name: Arc<str>,
}

impl AppState {
    /// Creates a new application state with the given store.
    pub fn new(user_store: Arc<dyn UserStore>, app_name: impl Into<Arc<str>>) -> Self {
        Self {
            user_store,
            app_name: app_name.into(),
        }
    }

    /// Creates a new application state with an in-memory store.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()), "Loglink")
    }

    /// Returns a reference to the user store.
    #[must_use]
    pub fn user_store(&self) -> &dyn UserStore {
        self.user_store.as_ref()
    }

    /// Returns the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
