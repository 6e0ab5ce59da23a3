// app_state.rs

use std::sync::Arc;

use crate::store::ChatStore;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Chat store handle wrapped in Arc for thread-safe sharing
    pub store: Arc<ChatStore>,
}

impl AppState {
    /// Creates a new instance of AppState
    ///
    /// # Arguments
    /// * `store` - Arc-wrapped chat store, opened once at startup
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self { store }
    }
}
