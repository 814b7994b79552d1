//! LLM-driven booking extraction.
//!
//! Instead of a fixed question sequence, every turn hands the recent
//! conversation to the model and asks for one structured booking object.
//! A parse failure or a missing required field is "not yet complete", not
//! an error; the conversation simply continues next turn. The extraction
//! call is attempted at most once per turn.

use serde::Deserialize;

use maitred_core::types::{BookingRecord, ChatMessage};

use crate::client::ChatClient;
use crate::error::LlmError;

const EXTRACTION_SYSTEM: &str =
    "You extract booking details from conversations. Return ONLY valid JSON, no other text.";

/// Derives a structured booking record from unstructured conversation
/// text via the language model.
pub struct BookingExtractor {
    client: ChatClient,
    /// Most recent history messages included in the extraction prompt.
    window: usize,
    temperature: f64,
}

impl BookingExtractor {
    pub fn new(client: ChatClient, window: usize, temperature: f64) -> Self {
        Self {
            client,
            window,
            temperature,
        }
    }

    /// Ask the model for a complete booking from the recent history.
    ///
    /// Returns `Some` only when all required fields came back non-null.
    /// Upstream failures are logged and swallowed: extraction never blocks
    /// the conversation.
    pub async fn extract(&self, history: &[ChatMessage]) -> Option<BookingRecord> {
        let prompt = build_extraction_prompt(history, self.window);
        let messages = vec![
            ChatMessage::system(EXTRACTION_SYSTEM),
            ChatMessage::user(prompt),
        ];

        let content = match self.client.complete(&messages, Some(self.temperature)).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "Booking extraction call failed");
                return None;
            }
        };

        parse_extraction(&content)
    }
}

/// Build the extraction instruction over the last `window` messages.
pub fn build_extraction_prompt(history: &[ChatMessage], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let conversation: String = history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Extract booking information from this conversation:\n\n\
         {conversation}\n\n\
         Return JSON in this exact format:\n\
         {{\n\
         \x20 \"date\": \"2025-11-01\",\n\
         \x20 \"startTime\": \"2:00 PM\",\n\
         \x20 \"endTime\": \"5:00 PM\",\n\
         \x20 \"partySize\": 25,\n\
         \x20 \"eventType\": \"Graduation Party\",\n\
         \x20 \"food\": \"pasta and pizza\",\n\
         \x20 \"email\": \"guest@example.com\",\n\
         \x20 \"phone\": \"330-555-0199\",\n\
         \x20 \"notes\": \"\"\n\
         }}\n\n\
         Rules:\n\
         - date must be YYYY-MM-DD format\n\
         - times in 12-hour format with AM/PM\n\
         - partySize as a number\n\
         - Use null for any missing fields\n\
         - Return ONLY the JSON object\n\n\
         Extract the data now:"
    )
}

/// Parse the model's reply into a booking record.
///
/// Strips incidental markdown code fencing, then requires date, start
/// time, party size, email, and event type to all be present.
pub fn parse_extraction(content: &str) -> Option<BookingRecord> {
    let stripped = content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string();

    let extracted: ExtractedBooking = match serde_json::from_str(&stripped) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "Extraction reply was not valid JSON");
            return None;
        }
    };

    let record = BookingRecord {
        date: extracted.date,
        start_time: extracted.start_time,
        end_time: extracted.end_time,
        party_size: extracted.party_size.as_ref().and_then(coerce_party_size),
        event_type: extracted.event_type,
        food: extracted.food,
        email: extracted.email,
        phone: extracted.phone,
        decor: None,
        extras: extracted.notes.filter(|n| !n.is_empty()),
    };

    if record.is_complete() {
        Some(record)
    } else {
        tracing::debug!(
            date = record.date.is_some(),
            start_time = record.start_time.is_some(),
            party_size = record.party_size.is_some(),
            email = record.email.is_some(),
            event_type = record.event_type.is_some(),
            "Extraction incomplete"
        );
        None
    }
}

/// The model sometimes returns the party size as a string; accept both.
fn coerce_party_size(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedBooking {
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    party_size: Option<serde_json::Value>,
    event_type: Option<String>,
    food: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
}
