//! Shared foundations for Ziggy: domain types, the menu catalog,
//! configuration, and the top-level error type.

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::Catalog;
pub use config::ZiggyConfig;
pub use error::{Result, ZiggyError};
pub use types::*;
