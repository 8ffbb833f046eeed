//! Embedded chat widget.
//!
//! A floating "Ziggy" tab that opens a chat window, keeps a `sessionId` in
//! `localStorage` and posts `{ message, sessionId }` to `/api/chat` on the
//! origin it is served from. Set `data-api-base` on the `#ziggy` container
//! to point it at another host.

/// The complete self-contained widget page.
pub const WIDGET_HTML: &str = include_str!("../assets/widget.html");
