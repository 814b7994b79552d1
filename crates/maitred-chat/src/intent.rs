//! Keyword heuristics for routing the conversation.

/// Vocabulary that signals the user wants to start a booking.
const BOOKING_KEYWORDS: &[&str] = &["book", "banquet", "reserve", "party", "event"];

/// Phrases that close the booking at the final step.
const NEGATION_PHRASES: &[&str] = &["no", "that's it", "thats it", "nope"];

/// Whether a message expresses booking intent.
///
/// Case-insensitive substring match over a small fixed vocabulary. A
/// message without any keyword routes to free-form assistant chat instead
/// of the booking flow.
pub fn is_booking_intent(message: &str) -> bool {
    let lower = message.to_lowercase();
    BOOKING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Whether a terminal-step message declines to add anything further.
pub fn is_negation(message: &str) -> bool {
    let lower = message.to_lowercase();
    NEGATION_PHRASES.iter().any(|p| lower.contains(p))
}
