use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for Ziggy.
///
/// Loaded from `ziggy.toml` (or the path in `ZIGGY_CONFIG`), then overlaid
/// with environment variables. Secrets only ever come from the environment
/// and are skipped when the config is serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZiggyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub recommend_service: RecommendServiceConfig,
}

impl ZiggyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ZiggyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(p) => self.server.port = p,
                Err(e) => warn!(value = %port, error = %e, "Ignoring invalid PORT"),
            }
        }
        if let Some(port) = get("RECOMMENDATION_SERVICE_PORT") {
            match port.trim().parse() {
                Ok(p) => self.recommend_service.port = p,
                Err(e) => {
                    warn!(value = %port, error = %e, "Ignoring invalid RECOMMENDATION_SERVICE_PORT")
                }
            }
        }
        if let Some(url) = get("RECOMMENDATION_SERVICE_URL") {
            self.backend.remote_url = url.trim().trim_end_matches('/').to_string();
            self.backend.kind = BackendKind::Remote;
        }
        if let Some(kind) = get("ZIGGY_BACKEND") {
            match BackendKind::parse(&kind) {
                Some(k) => self.backend.kind = k,
                None => warn!(value = %kind, "Ignoring unknown ZIGGY_BACKEND"),
            }
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(key.trim().to_string());
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.recommend_service.shared_secret = Some(secret.trim().to_string());
        }
        if let Some(path) = get("MENU_PATH") {
            self.catalog.menu_path = PathBuf::from(path.trim());
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Chat HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

/// Where the menu lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub menu_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            menu_path: PathBuf::from("data/menu.json"),
        }
    }
}

/// Conversation router settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Reject messages longer than this many characters. Unset or zero
    /// accepts any length.
    pub max_message_length: Option<usize>,
    /// Hold a per-session lock for the whole routing call so that
    /// transcripts follow arrival order.
    pub serialize_same_session: bool,
    /// Session retention. Unset fields mean "keep forever".
    #[serde(default)]
    pub sessions: SessionRetentionConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: None,
            serialize_same_session: false,
            sessions: SessionRetentionConfig::default(),
        }
    }
}

/// Session store retention limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRetentionConfig {
    /// Maximum number of live sessions before the least recently active is evicted.
    pub max_sessions: Option<usize>,
    /// Idle time after which a session is dropped.
    pub idle_ttl_secs: Option<u64>,
}

/// Which recommendation backend answers free-form messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Call the language-model API from the chat server.
    #[default]
    Direct,
    /// Forward to the recommendation microservice.
    Remote,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(BackendKind::Direct),
            "remote" => Some(BackendKind::Remote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Direct => "direct",
            BackendKind::Remote => "remote",
        }
    }
}

/// Recommendation backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL of the recommendation microservice.
    pub remote_url: String,
    /// Client-side timeout for the microservice call.
    pub remote_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Direct,
            remote_url: "http://localhost:5001".to_string(),
            remote_timeout_secs: 10,
        }
    }
}

/// Chat-completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            request_timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Recommendation microservice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendServiceConfig {
    pub host: String,
    pub port: u16,
    /// User-agent substrings admitted without a bearer token.
    pub internal_user_agents: Vec<String>,
    #[serde(skip)]
    pub shared_secret: Option<String>,
}

impl Default for RecommendServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            internal_user_agents: vec!["ziggy-chat".to_string(), "Node.js".to_string()],
            shared_secret: None,
        }
    }
}
