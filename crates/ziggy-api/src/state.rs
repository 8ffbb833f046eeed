//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use ziggy_chat::ChatRouter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Intent router owning the catalog, sessions and backend.
    pub router: Arc<ChatRouter>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(router: ChatRouter) -> Self {
        Self {
            router: Arc::new(router),
            start_time: Instant::now(),
        }
    }
}
