//! Caller admission for the recommendation service.
//!
//! Permissive on purpose: a presented token that does not match the shared
//! secret is logged and the request continues. Requests without any token
//! are admitted only from a loopback peer or a recognized internal
//! `User-Agent`; everything else gets 401.
//!
//! The token is compared literally with the shared secret. Nothing is
//! decoded or signature-checked, so a genuine signed JWT counts as a
//! mismatch and is logged as invalid unless it equals the secret verbatim.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, warn};
use ziggy_chat::RecommendationResponse;

use crate::state::{ServiceAuth, ServiceState};

/// Token from `Authorization` (last whitespace-separated word) or the
/// `token` header.
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    let from_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().last());
    let from_token = || headers.get("token").and_then(|v| v.to_str().ok());

    from_authorization
        .or_else(from_token)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Whether a token-less caller may proceed.
pub fn is_internal_caller(auth: &ServiceAuth, peer: Option<SocketAddr>, headers: &HeaderMap) -> bool {
    if peer.is_some_and(|addr| addr.ip().is_loopback()) {
        return true;
    }
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    auth.internal_user_agents
        .iter()
        .any(|known| agent.contains(known.as_str()))
}

/// Middleware guarding the generation endpoint.
pub async fn require_service_auth(
    State(state): State<ServiceState>,
    req: Request,
    next: Next,
) -> Response {
    let headers = req.headers();

    if let Some(token) = presented_token(headers) {
        match state.auth.shared_secret.as_deref() {
            Some(secret) if secret == token => debug!("Caller token accepted"),
            Some(_) => warn!("Caller presented an invalid token"),
            None => warn!("Shared secret not configured, token not checked"),
        }
        return next.run(req).await;
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    if is_internal_caller(&state.auth, peer, headers) {
        return next.run(req).await;
    }

    warn!(peer = ?peer, "Rejected unauthenticated caller");
    (
        StatusCode::UNAUTHORIZED,
        Json(RecommendationResponse::failed("Unauthorized", "")),
    )
        .into_response()
}
