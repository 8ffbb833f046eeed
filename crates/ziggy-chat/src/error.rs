//! Error types for the conversational assistant.

use ziggy_core::error::ZiggyError;

/// Errors from the chat router and its backends.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Caller supplied an unusable request (missing session, blank message).
    #[error("{0}")]
    Validation(String),
    /// The language-model API failed or answered with an unexpected shape.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// The language-model API answered HTTP 429.
    #[error("upstream rate limit exceeded")]
    RateLimited,
    /// The recommendation service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ChatError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ChatError::Validation(msg.into())
    }
}

impl From<ZiggyError> for ChatError {
    fn from(err: ZiggyError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            ChatError::RateLimited
        } else if err.is_decode() {
            ChatError::Upstream(format!("malformed response: {}", err))
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}
