//! Ziggy recommendation service - menu-aware generation behind HTTP.
//!
//! The chat server's remote backend posts `{ message, sessionId,
//! conversationHistory }` here and gets `{ reply, success, error? }` back.

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, start_server};
pub use state::{ServiceAuth, ServiceState};
