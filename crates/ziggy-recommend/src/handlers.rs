//! Route handlers for the recommendation service.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use ziggy_chat::{GenerationRequest, RecommendationRequest, RecommendationResponse};
use ziggy_core::ConversationTurn;

use crate::state::ServiceState;

pub const MESSAGE_REQUIRED: &str = "Message is required";

/// Reply when nothing on the menu is currently available.
pub const NO_ITEMS_REPLY: &str =
    "I'm sorry, but we don't have any available items at the moment. Please check back later!";

pub const GENERATION_FAILED: &str =
    "An error occurred while generating recommendations. Please try again later.";

pub const GENERATION_FAILED_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again!";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// POST /api/recommendation/generate
pub async fn generate(
    State(state): State<ServiceState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> (StatusCode, Json<RecommendationResponse>) {
    let req = match payload {
        Ok(Json(req)) if !req.message.trim().is_empty() => req,
        Ok(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RecommendationResponse::failed(MESSAGE_REQUIRED, "")),
            )
        }
        Err(e) => {
            debug!(error = %e, "Rejected generation body");
            return (
                StatusCode::BAD_REQUEST,
                Json(RecommendationResponse::failed(MESSAGE_REQUIRED, "")),
            );
        }
    };

    info!(session_id = %req.session_id, "Received recommendation request");

    if state.catalog.available_items().is_empty() {
        return (StatusCode::OK, Json(RecommendationResponse::ok(NO_ITEMS_REPLY)));
    }

    let history: Vec<ConversationTurn> = req
        .conversation_history
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|turn| {
            let parsed = turn.to_turn();
            if parsed.is_none() {
                debug!(role = %turn.role, "Skipping history entry with unknown role");
            }
            parsed
        })
        .collect();

    let result = state
        .backend
        .generate(GenerationRequest {
            session_id: &req.session_id,
            message: &req.message,
            history: &history,
        })
        .await;

    match result {
        Ok(reply) => (StatusCode::OK, Json(RecommendationResponse::ok(reply))),
        Err(e) => {
            error!(session_id = %req.session_id, error = %e, "Recommendation generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RecommendationResponse::failed(
                    GENERATION_FAILED,
                    GENERATION_FAILED_REPLY,
                )),
            )
        }
    }
}

/// GET /api/recommendation/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "recommendation-service".to_string(),
    })
}
