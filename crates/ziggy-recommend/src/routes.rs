//! Router setup for the recommendation service.

use std::future::Future;
use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use ziggy_core::config::RecommendServiceConfig;
use ziggy_core::ZiggyError;

use crate::auth::require_service_auth;
use crate::handlers;
use crate::state::ServiceState;

pub fn create_router(state: ServiceState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/recommendation/health", get(handlers::health));

    let protected_routes = Router::new()
        .route("/api/recommendation/generate", post(handlers::generate))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_service_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `recommend_service.host:port` until `shutdown` resolves.
///
/// Peer addresses are recorded so the auth middleware can admit loopback
/// callers.
pub async fn start_server<F>(
    config: &RecommendServiceConfig,
    state: ServiceState,
    shutdown: F,
) -> Result<(), ZiggyError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ZiggyError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Recommendation service listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| ZiggyError::Server(format!("Server error: {}", e)))?;

    tracing::info!("Recommendation service stopped");
    Ok(())
}
