//! Route handler functions for the chat server.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ziggy_core::ConversationTurn;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

/// Body of `POST /api/chat`. Missing fields are caught by the router's
/// validation so they get its error messages.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the server started.
    pub uptime: u64,
    pub backend: String,
    pub menu_items: usize,
}

// =============================================================================
// Chat
// =============================================================================

/// POST /api/chat - route one message and return the reply.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let reply = state.router.route(&req.message, &req.session_id).await?;
    debug!(session_id = %req.session_id.trim(), branch = ?reply.branch, "Chat reply sent");

    Ok(Json(ChatResponse { reply: reply.reply }))
}

/// GET /api/chat/{session_id}/history - transcript read-back.
pub async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let turns = state
        .router
        .transcript(&session_id)?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    Ok(Json(HistoryResponse { session_id, turns }))
}

/// DELETE /api/chat/{session_id} - forget a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.router.clear_session(&session_id)? {
        info!(session_id = %session_id, "Session cleared");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Session not found".to_string()))
    }
}

// =============================================================================
// Health, banner, widget
// =============================================================================

/// GET /health - liveness with uptime and backend summary.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        backend: state.router.backend_kind().as_str().to_string(),
        menu_items: state.router.catalog().len(),
    })
}

/// GET / - plain-text banner.
pub async fn root() -> &'static str {
    "API Working"
}

/// GET /widget - the embedded chat widget.
pub async fn widget() -> impl IntoResponse {
    Html(ziggy_ui::WIDGET_HTML)
}
