//! Ziggy UI crate - the embeddable chat widget.
//!
//! The widget is a single self-contained HTML file with CSS and JavaScript
//! inlined, embedded at compile time via `include_str!`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ziggy_ui::widget::WIDGET_HTML;
//!
//! async fn widget_handler() -> axum::response::Html<&'static str> {
//!     axum::response::Html(WIDGET_HTML)
//! }
//! ```

pub mod widget;

pub use widget::WIDGET_HTML;
