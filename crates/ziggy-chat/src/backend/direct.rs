//! In-process backend calling an OpenAI-compatible chat-completion API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use ziggy_core::config::{BackendKind, LlmConfig};
use ziggy_core::{Catalog, ConversationTurn};

use crate::backend::{GenerationRequest, RecommendationBackend};
use crate::error::ChatError;
use crate::prompt;

// OpenAI-compatible request/response
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionChoiceMessage>,
}

#[derive(Deserialize)]
struct CompletionChoiceMessage {
    content: Option<String>,
}

/// Calls the language model from the chat server and reports failures as
/// `Upstream` or `RateLimited`.
pub struct DirectBackend {
    catalog: Arc<Catalog>,
    config: LlmConfig,
    client: reqwest::Client,
}

impl DirectBackend {
    pub fn new(catalog: Arc<Catalog>, config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            catalog,
            config,
            client,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Send a fully composed message list and return the first choice's text.
    pub async fn complete(&self, messages: &[ConversationTurn]) -> Result<String, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ChatError::Upstream("language model API key is not configured".into()))?;

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let body = CompletionRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| CompletionMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Language model request failed");
                ChatError::Upstream(format!("request failed: {}", e))
            })?;

        let status = res.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            error!("Language model API rate limit exceeded");
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            error!(%status, body = %text, "Language model API error");
            return Err(ChatError::Upstream(format!("API error {}", status)));
        }

        let parsed: CompletionResponse = res.json().await.map_err(|e| {
            error!(error = %e, "Language model response parse failed");
            ChatError::Upstream(format!("malformed response: {}", e))
        })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| {
                error!("Unexpected language model response structure");
                ChatError::Upstream("unexpected API response structure".into())
            })?;

        debug!(model = %self.config.model, "Language model reply received");
        Ok(reply)
    }
}

#[async_trait]
impl RecommendationBackend for DirectBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Direct
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ChatError> {
        let system = prompt::system_prompt(self.catalog.items());
        let messages = prompt::compose_messages(system, request.history, request.message);
        self.complete(&messages).await
    }
}
