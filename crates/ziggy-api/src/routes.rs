//! Router setup with all chat routes and middleware.

use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use ziggy_core::{ZiggyConfig, ZiggyError};

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The widget may be embedded on any storefront origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/widget", get(handlers::widget))
        .route("/api/chat", post(handlers::chat))
        .route("/api/chat/{session_id}", delete(handlers::delete_session))
        .route("/api/chat/{session_id}/history", get(handlers::history))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the chat API on `server.host:server.port` until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ZiggyConfig,
    state: AppState,
    shutdown: F,
) -> Result<(), ZiggyError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ZiggyError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Chat server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ZiggyError::Server(format!("Server error: {}", e)))?;

    tracing::info!("Chat server stopped");
    Ok(())
}
