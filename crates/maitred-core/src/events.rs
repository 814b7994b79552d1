use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events carried on the server-to-client response stream.
///
/// The transport multiplexes assistant text and control signals onto one
/// ordered channel. Modeling the frames as a tagged union keeps the
/// decode-by-string-prefix logic in exactly one place (the wire codec)
/// instead of leaking into every layer.
///
/// Ordering contract: every turn's stream begins with `SessionAssigned`
/// and ends with `Done`, with any number of `Chunk`s and at most one
/// `BookingSaved` in between.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StreamEvent {
    /// Announces the session identifier so the client can echo it on
    /// subsequent turns. Always the first frame.
    SessionAssigned { session_id: Uuid },

    /// One fragment of assistant text.
    Chunk(String),

    /// A completed booking was handed to the persistence sinks.
    BookingSaved,

    /// End of stream. Always the last frame.
    Done,
}

impl StreamEvent {
    /// Returns a stable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::SessionAssigned { .. } => "session_assigned",
            StreamEvent::Chunk(_) => "chunk",
            StreamEvent::BookingSaved => "booking_saved",
            StreamEvent::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let id = Uuid::new_v4();
        assert_eq!(
            StreamEvent::SessionAssigned { session_id: id }.event_name(),
            "session_assigned"
        );
        assert_eq!(StreamEvent::Chunk("hi".into()).event_name(), "chunk");
        assert_eq!(StreamEvent::BookingSaved.event_name(), "booking_saved");
        assert_eq!(StreamEvent::Done.event_name(), "done");
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let events = vec![
            StreamEvent::SessionAssigned {
                session_id: Uuid::new_v4(),
            },
            StreamEvent::Chunk("Wonderful — what date?".to_string()),
            StreamEvent::BookingSaved,
            StreamEvent::Done,
        ];

        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: StreamEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(&back, event);
            assert_eq!(back.event_name(), event.event_name());
        }
    }
}
