use thiserror::Error;

/// Top-level error type for Ziggy.
///
/// Subsystem crates define their own error enums and convert into this one
/// where they cross crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZiggyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ZiggyError {
    fn from(err: toml::de::Error) -> Self {
        ZiggyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ZiggyError {
    fn from(err: serde_json::Error) -> Self {
        ZiggyError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ziggy operations.
pub type Result<T> = std::result::Result<T, ZiggyError>;
