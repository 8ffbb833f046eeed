//! Recommendation backend trait and its two strategies.
//!
//! The router sees a single `RecommendationBackend`. `DirectBackend` calls
//! the chat-completion API itself and surfaces typed failures;
//! `RemoteBackend` forwards to the recommendation service and never fails,
//! answering with an apology instead.

pub mod direct;
pub mod remote;

use async_trait::async_trait;
use ziggy_core::config::BackendKind;
use ziggy_core::ConversationTurn;

use crate::error::ChatError;

pub use direct::DirectBackend;
pub use remote::{RecommendationRequest, RecommendationResponse, RemoteBackend, WireTurn};

/// Input for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub session_id: &'a str,
    /// The new user message.
    pub message: &'a str,
    /// Turns that preceded `message`, oldest first.
    pub history: &'a [ConversationTurn],
}

/// Produces an assistant reply for free-form messages.
#[async_trait]
pub trait RecommendationBackend: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> BackendKind;

    /// Generate the assistant reply for `request`.
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ChatError>;
}
