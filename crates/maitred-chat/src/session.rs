//! Per-conversation session state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use maitred_core::types::{BookingRecord, ChatMessage};

use crate::steps::BookingStep;

/// System persona preloaded into every fresh session's history.
pub const SYSTEM_PERSONA: &str = "You are a polite, friendly banquet-booking assistant. \
Ask one question at a time. Treat booking details from the server as authoritative.";

/// Server-side conversation state keyed by an opaque identifier.
///
/// The client only ever holds the identifier; the state itself is owned
/// exclusively by the server process and mutated in place per turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier shared with the client.
    pub id: Uuid,
    /// Current position in the guided question sequence.
    pub step: BookingStep,
    /// Booking fields accumulated so far.
    pub booking: BookingRecord,
    /// Ordered role-tagged message history, replayed as prompt context.
    pub history: Vec<ChatMessage>,
    /// The last prompt the server issued, kept for context.
    pub last_prompt: String,
}

impl Session {
    /// Create a fresh session at the greeting step with the system persona
    /// preloaded.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            step: BookingStep::Greeting,
            booking: BookingRecord::default(),
            history: vec![ChatMessage::system(SYSTEM_PERSONA)],
            last_prompt: String::new(),
        }
    }

    /// Reinitialize to the greeting step, discarding accumulated booking
    /// fields and history but keeping the identifier.
    pub fn reset(&mut self) {
        *self = Session::new(self.id);
    }
}
