//! Chat page HTML generation and embedding.
//!
//! The chat client is a single self-contained HTML file with all CSS and
//! JavaScript inlined, embedded at compile time via `include_str!` so the
//! binary has no external file dependencies at runtime.

/// The complete self-contained chat page.
///
/// A single HTML file with zero external dependencies: no CDN links, no
/// npm packages, no build step. It posts user text to `/api/assistant`,
/// reads the incremental response stream, and renders messages:
///
/// - frames are newline-delimited and prefix-matched on `data: `
/// - the session-identifier frame is captured and echoed on later turns
/// - `[BOOKING_SAVED]` surfaces a confirmation bubble
/// - `[DONE]` ends the turn
/// - text fragments accumulate into the turn's placeholder bubble, with
///   `\n` escapes converted back to newlines
pub const CHAT_HTML: &str = include_str!("../assets/chat.html");
