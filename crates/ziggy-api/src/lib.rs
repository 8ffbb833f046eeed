//! Ziggy API crate - axum HTTP server for the chat assistant.
//!
//! Serves the chat endpoint, transcript read-back, health checks and the
//! embedded chat widget.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
