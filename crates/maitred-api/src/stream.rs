//! Wire encoding for the assistant response stream.
//!
//! The transport is newline-delimited `data: <payload>` frames over one
//! long-lived `text/event-stream` response. [`StreamEvent`] is the tagged
//! union behind those frames; this module is the only place that knows
//! the literal payload forms the client prefix-matches on.

use maitred_core::StreamEvent;

/// End-of-stream marker. Always the last frame of a turn.
pub const DONE_MARKER: &str = "[DONE]";

/// Completion signal emitted after a booking reached the sinks.
pub const BOOKING_SAVED_MARKER: &str = "[BOOKING_SAVED]";

/// Encode one event into its frame payload (the part after `data: `).
///
/// Newlines inside chunk text are escaped so every payload stays on a
/// single line; the client unescapes them after prefix matching.
pub fn encode_payload(event: &StreamEvent) -> String {
    match event {
        StreamEvent::SessionAssigned { session_id } => {
            format!("{{\"sessionId\":\"{session_id}\"}}")
        }
        StreamEvent::Chunk(text) => escape_newlines(text),
        StreamEvent::BookingSaved => BOOKING_SAVED_MARKER.to_string(),
        StreamEvent::Done => DONE_MARKER.to_string(),
        _ => unreachable!("unhandled StreamEvent variant"),
    }
}

/// Escape raw newlines for single-line framing.
fn escape_newlines(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// Split text into fixed-size chunks (by characters, not bytes), used
/// when replaying a precomputed prompt through the stream.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let size = chunk_size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|c| c.iter().collect())
        .collect()
}
