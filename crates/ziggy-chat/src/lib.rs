//! Conversational assistant for the food ordering storefront.
//!
//! Routes each incoming message to a canned FAQ answer, a rule-based menu
//! filter, or a language-model backend, and keeps per-session transcripts.

pub mod backend;
pub mod error;
pub mod faq;
pub mod intent;
pub mod prompt;
pub mod recommend;
pub mod router;
pub mod session;

pub use backend::{
    DirectBackend, GenerationRequest, RecommendationBackend, RecommendationRequest,
    RecommendationResponse, RemoteBackend, WireTurn,
};
pub use error::ChatError;
pub use intent::{Intent, MenuFilter};
pub use router::{Branch, ChatReply, ChatRouter};
pub use session::{InMemorySessionStore, RetentionPolicy, Session, SessionStore};
