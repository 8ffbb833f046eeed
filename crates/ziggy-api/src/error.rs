//! API error types and JSON error response formatting.
//!
//! Every failure is answered with `{ "error": <message>, "code": <code> }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use ziggy_chat::ChatError;

/// Message shown for any upstream or internal failure.
pub const GENERIC_ERROR: &str = "Chatbot error";

/// Message shown when the language model rate-limits us.
pub const RATE_LIMITED_ERROR: &str = "Rate limit exceeded. Please try again later.";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code (e.g., "bad_request", "rate_limited").
    pub code: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    BadRequest(String),
    /// 404 Not Found - unknown session.
    NotFound(String),
    /// 429 Too Many Requests - the language model asked us to back off.
    RateLimited,
    /// 500 Internal Server Error - generation or storage failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                RATE_LIMITED_ERROR.to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(msg) => ApiError::BadRequest(msg),
            ChatError::RateLimited => ApiError::RateLimited,
            ChatError::Upstream(_) | ChatError::Transport(_) | ChatError::Storage(_) => {
                ApiError::Internal(GENERIC_ERROR.to_string())
            }
        }
    }
}
