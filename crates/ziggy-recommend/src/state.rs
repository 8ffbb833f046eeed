//! Shared state for the recommendation service.

use std::sync::Arc;

use ziggy_chat::RecommendationBackend;
use ziggy_core::config::RecommendServiceConfig;
use ziggy_core::Catalog;

/// Caller admission settings for [`crate::auth::require_service_auth`].
#[derive(Debug, Clone, Default)]
pub struct ServiceAuth {
    /// Expected bearer token. Mismatches are logged, not rejected.
    pub shared_secret: Option<String>,
    /// `User-Agent` fragments admitted without a token.
    pub internal_user_agents: Vec<String>,
}

impl From<&RecommendServiceConfig> for ServiceAuth {
    fn from(config: &RecommendServiceConfig) -> Self {
        Self {
            shared_secret: config.shared_secret.clone().filter(|s| !s.is_empty()),
            internal_user_agents: config
                .internal_user_agents
                .iter()
                .filter(|a| !a.is_empty())
                .cloned()
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct ServiceState {
    pub catalog: Arc<Catalog>,
    /// Model backend; the service runs the in-process strategy.
    pub backend: Arc<dyn RecommendationBackend>,
    pub auth: Arc<ServiceAuth>,
}

impl ServiceState {
    pub fn new(
        catalog: Arc<Catalog>,
        backend: Arc<dyn RecommendationBackend>,
        auth: ServiceAuth,
    ) -> Self {
        Self {
            catalog,
            backend,
            auth: Arc::new(auth),
        }
    }
}
