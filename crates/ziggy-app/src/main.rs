//! Ziggy application binary - composition root.
//!
//! 1. Load `.env`, the TOML configuration and environment overrides
//! 2. Load the menu catalog
//! 3. Run either the chat server (`serve`) with the configured backend, or
//!    the recommendation service (`recommend`)

mod cli;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use ziggy_api::state::AppState;
use ziggy_chat::{
    ChatRouter, DirectBackend, InMemorySessionStore, RecommendationBackend, RemoteBackend,
    RetentionPolicy,
};
use ziggy_core::config::BackendKind;
use ziggy_core::{Catalog, ZiggyConfig, ZiggyError};
use ziggy_recommend::{ServiceAuth, ServiceState};

use crate::cli::{CliArgs, Command};

/// Longest pause between idle-session sweeps.
const MAX_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();
    let (mut config, config_error) = read_config(&config_file);
    config.apply_env_overrides();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(args.resolve_log_filter(&config.general.log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Ziggy v{}", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }
    match config_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
    }

    match args.command() {
        Command::Serve => {
            config.server.port = args.resolve_port(config.server.port);
            run_chat_server(config).await?;
        }
        Command::Recommend => {
            config.recommend_service.port = args.resolve_port(config.recommend_service.port);
            run_recommend_service(config).await?;
        }
    }
    Ok(())
}

/// Read the config file before logging is up; the error is reported later.
fn read_config(path: &Path) -> (ZiggyConfig, Option<ZiggyError>) {
    if !path.exists() {
        return (ZiggyConfig::default(), None);
    }
    match ZiggyConfig::load(path) {
        Ok(config) => (config, None),
        Err(e) => (ZiggyConfig::default(), Some(e)),
    }
}

async fn run_chat_server(config: ZiggyConfig) -> Result<(), ZiggyError> {
    let catalog = Arc::new(Catalog::load(&config.catalog.menu_path));

    let backend: Arc<dyn RecommendationBackend> = match config.backend.kind {
        BackendKind::Direct => {
            if config.llm.api_key.is_none() {
                tracing::warn!("OPENAI_API_KEY is not set, generated replies will fail");
            }
            Arc::new(DirectBackend::new(Arc::clone(&catalog), config.llm.clone()))
        }
        BackendKind::Remote => Arc::new(RemoteBackend::new(
            &config.backend.remote_url,
            Duration::from_secs(config.backend.remote_timeout_secs),
            config.recommend_service.shared_secret.clone(),
        )),
    };
    tracing::info!(
        backend = backend.kind().as_str(),
        remote_url = %config.backend.remote_url,
        "Recommendation backend selected"
    );

    let policy = RetentionPolicy::from(&config.chat.sessions);
    let sessions = Arc::new(InMemorySessionStore::new(policy));
    if let Some(ttl) = policy.idle_ttl.and_then(|ttl| ttl.to_std().ok()) {
        spawn_session_purge(Arc::clone(&sessions), ttl.min(MAX_PURGE_INTERVAL));
    }

    let router = ChatRouter::new(catalog, sessions, backend, config.chat.clone());
    ziggy_api::start_server(&config, AppState::new(router), shutdown_signal()).await
}

async fn run_recommend_service(config: ZiggyConfig) -> Result<(), ZiggyError> {
    let catalog = Arc::new(Catalog::load(&config.catalog.menu_path));
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set, generation requests will fail");
    }
    if config.recommend_service.shared_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set, caller tokens will not be checked");
    }

    let backend = Arc::new(DirectBackend::new(Arc::clone(&catalog), config.llm.clone()));
    let auth = ServiceAuth::from(&config.recommend_service);
    let state = ServiceState::new(catalog, backend, auth);

    ziggy_recommend::start_server(&config.recommend_service, state, shutdown_signal()).await
}

/// Periodically drop sessions idle beyond the retention TTL.
fn spawn_session_purge(sessions: Arc<InMemorySessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.purge_expired() {
                tracing::error!(error = %e, "Session purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
