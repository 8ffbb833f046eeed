//! Menu catalog.
//!
//! Loaded once at startup from a JSON array of menu items and never mutated
//! afterwards. A missing or unreadable menu yields an empty catalog and a
//! warning rather than a startup failure.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{Result, ZiggyError};
use crate::types::MenuItem;

/// Read-only, in-memory menu.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    /// Load the catalog from a JSON file, falling back to an empty catalog.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(catalog) => {
                info!(
                    items = catalog.len(),
                    path = %path.display(),
                    "Menu catalog loaded"
                );
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Menu unavailable, using empty catalog");
                Self::default()
            }
        }
    }

    /// Load the catalog from a JSON file, surfacing read and parse failures.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ZiggyError::Catalog(format!(
                "menu file not found at {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a catalog from a JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<MenuItem> = serde_json::from_str(json)?;
        Ok(Self { items })
    }

    /// Every item, in load order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Items currently available, in load order.
    pub fn available_items(&self) -> Vec<&MenuItem> {
        self.items.iter().filter(|item| item.availability).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
