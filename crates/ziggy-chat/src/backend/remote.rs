//! Backend that delegates generation to the recommendation service.
//!
//! Any failure (timeout, refused connection, error status, malformed body,
//! `success: false`) is logged and answered with [`FALLBACK_REPLY`]. The chat
//! never sees an error from this backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ziggy_core::config::BackendKind;
use ziggy_core::{ConversationTurn, Role};

use crate::backend::{GenerationRequest, RecommendationBackend};
use crate::error::ChatError;

/// Reply used whenever the recommendation service cannot answer.
pub const FALLBACK_REPLY: &str = "Something went wrong, please try again.";

/// Path of the generation endpoint on the recommendation service.
pub const GENERATE_PATH: &str = "/api/recommendation/generate";

// =============================================================================
// Wire types
// =============================================================================

/// A transcript entry as exchanged with the recommendation service.
///
/// Roles travel as free text and are matched case-insensitively on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: String,
    pub content: String,
}

impl From<&ConversationTurn> for WireTurn {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

impl WireTurn {
    /// Convert to a typed turn; `None` for unrecognized roles.
    pub fn to_turn(&self) -> Option<ConversationTurn> {
        Role::parse(&self.role).map(|role| ConversationTurn {
            role,
            content: self.content.clone(),
        })
    }
}

/// Body of `POST /api/recommendation/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<WireTurn>>,
}

/// Response of `POST /api/recommendation/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub reply: String,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl RecommendationResponse {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// RemoteBackend
// =============================================================================

/// HTTP client for the recommendation service.
pub struct RemoteBackend {
    endpoint: String,
    shared_secret: Option<String>,
    client: reqwest::Client,
}

impl RemoteBackend {
    /// Create a client for the service at `base_url` with a per-call timeout.
    pub fn new(base_url: &str, timeout: Duration, shared_secret: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ziggy-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
            shared_secret: shared_secret.filter(|s| !s.is_empty()),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn try_generate(&self, request: GenerationRequest<'_>) -> Result<String, ChatError> {
        let body = RecommendationRequest {
            message: request.message.to_string(),
            session_id: request.session_id.to_string(),
            conversation_history: Some(request.history.iter().map(WireTurn::from).collect()),
        };

        let mut call = self.client.post(&self.endpoint).json(&body);
        if let Some(ref secret) = self.shared_secret {
            call = call.bearer_auth(secret);
        }

        let res = call.send().await?.error_for_status()?;
        let parsed: RecommendationResponse = res.json().await?;

        if !parsed.success || parsed.reply.trim().is_empty() {
            return Err(ChatError::Upstream(
                parsed
                    .error
                    .unwrap_or_else(|| "empty reply from recommendation service".to_string()),
            ));
        }
        Ok(parsed.reply)
    }
}

#[async_trait]
impl RecommendationBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ChatError> {
        match self.try_generate(request).await {
            Ok(reply) => {
                debug!(session_id = %request.session_id, "Recommendation service replied");
                Ok(reply)
            }
            Err(e) => {
                warn!(
                    session_id = %request.session_id,
                    endpoint = %self.endpoint,
                    error = %e,
                    "Recommendation service unavailable, replying with fallback"
                );
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }
}
