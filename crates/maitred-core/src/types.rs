use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// How booking fields are gathered from the conversation.
///
/// One strategy is chosen per deployment; the two are never mixed within a
/// single server instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStrategy {
    /// Fixed question sequence driven by the step machine. The session is
    /// reset to the greeting step once a booking is confirmed.
    #[default]
    Guided,
    /// Free-form conversation; after every turn the full recent history is
    /// handed to the language model to extract a structured record. The
    /// session is retained indefinitely.
    Extraction,
}

/// The author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name used in chat-completion payloads and history files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

/// One entry of a session's conversation history.
///
/// History is append-only and replayed as prompt context on every turn.
/// The persisted field name is `sender` to match the on-disk session layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "sender")]
    pub role: MessageRole,
    pub text: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

// =============================================================================
// Booking record
// =============================================================================

/// The structured set of fields required to create a banquet reservation.
///
/// Fields start out empty and are filled in one at a time by the guided
/// flow, or all at once by the extraction flow. Unparseable free-text input
/// is captured verbatim rather than rejected, so string fields may hold raw
/// user phrasing until normalized at the persistence boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Calendar date, `YYYY-MM-DD` when parsed, verbatim text otherwise.
    pub date: Option<String>,
    /// Event start time as entered (e.g. "6pm", "18:00").
    pub start_time: Option<String>,
    /// Event end time as entered.
    pub end_time: Option<String>,
    /// Expected number of guests.
    pub party_size: Option<u32>,
    /// Kind of event (birthday party, wedding reception, ...).
    pub event_type: Option<String>,
    /// Food or catering description.
    pub food: Option<String>,
    /// Contact email for confirmation.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Decor or theme preference.
    pub decor: Option<String>,
    /// Free-text special requests.
    pub extras: Option<String>,
}

impl BookingRecord {
    /// Whether the record carries everything persistence requires.
    ///
    /// Date, start time, party size, email, and event type must all be
    /// present; the remaining fields are optional. Completeness gates every
    /// calendar/spreadsheet write.
    pub fn is_complete(&self) -> bool {
        self.date.is_some()
            && self.start_time.is_some()
            && self.party_size.is_some()
            && self.email.is_some()
            && self.event_type.is_some()
    }
}
