//! Domain types shared by the router, the backends, and both HTTP services.

use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Conversation
// =============================================================================

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// The lowercase wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a role name case-insensitively.
    pub fn parse(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

// =============================================================================
// Menu
// =============================================================================

/// Menu item identifier. Menu files in the wild use both numbers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

impl Default for ItemId {
    fn default() -> Self {
        ItemId::Number(0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// A dish on the menu. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: ItemId,
    pub name: String,
    /// Image file name served by the storefront; unused by the assistant.
    #[serde(default)]
    pub image: String,
    /// Zero when missing or not a number (e.g. "MP" for market price).
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub availability: bool,
    /// Free-form spice tag, e.g. "low", "medium", "high".
    #[serde(default)]
    pub spice_level: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MenuItem {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// A single odd field must not reject the whole menu file.

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Unsigned(u64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match LooseValue::deserialize(deserializer)? {
        LooseValue::Unsigned(n) => n as f64,
        LooseValue::Float(n) => n,
        LooseValue::Text(s) => s.trim().parse().unwrap_or(0.0),
        LooseValue::Other(_) => 0.0,
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<ItemId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Unsigned(n) => ItemId::Number(n),
        LooseValue::Float(n) => ItemId::Text(n.to_string()),
        LooseValue::Text(s) => ItemId::Text(s),
        LooseValue::Other(_) => ItemId::default(),
    })
}
