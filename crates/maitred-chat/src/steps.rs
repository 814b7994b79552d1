//! The guided booking step machine.
//!
//! A linear question sequence over named steps. Each step consumes the
//! current user message, applies a step-specific extraction (regex for
//! email/phone/party-size/time-range, the date parser for dates, verbatim
//! capture otherwise), writes the value into the booking record, and emits
//! the fixed prompt for the next step. Unparseable answers are captured
//! verbatim or skipped, never surfaced as failures.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use maitred_core::types::BookingRecord;

use crate::intent::{is_booking_intent, is_negation};
use crate::session::Session;
use crate::timeparse::{find_time, parse_date, parse_time_range};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").unwrap());

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\-\s()]{6,}\d").unwrap());

static PARTY_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,4}").unwrap());

/// A position in the fixed question sequence of the guided booking flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    /// First contact; branches on booking intent.
    Greeting,
    /// Greeting was shown; still waiting for the user to pick a direction.
    AwaitingIntent,
    AwaitingDate,
    AwaitingTime,
    AwaitingPartySize,
    AwaitingEventType,
    AwaitingFood,
    AwaitingEmail,
    AwaitingPhone,
    AwaitingDecor,
    /// Terminal step: extras or confirmation.
    AwaitingExtras,
}

impl BookingStep {
    /// The fixed prompt issued when this step is entered.
    pub fn prompt(&self) -> &'static str {
        match self {
            BookingStep::Greeting | BookingStep::AwaitingIntent => {
                "Hi there! I'm your banquet assistant. I can help you book a banquet \
                 or answer any questions! Would you like to book a banquet or ask a \
                 general question?"
            }
            BookingStep::AwaitingDate => {
                "Wonderful! What date would you like to book your banquet for?"
            }
            BookingStep::AwaitingTime => {
                "Got it! What time would you like your event to start (and end), \
                 like '6pm' or '6pm-9pm'?"
            }
            BookingStep::AwaitingPartySize => "Perfect. How many guests are you expecting?",
            BookingStep::AwaitingEventType => {
                "Noted. What type of event is this? Options include:\n\
                 - Anniversary Party\n\
                 - Bar/Bat Mitzvah\n\
                 - Birthday Party\n\
                 - Business Meeting\n\
                 - Charity Event\n\
                 - Corporate Event\n\
                 - Engagement Party\n\
                 - Wedding Reception\n\
                 - Graduation Party\n\
                 - Holiday Party"
            }
            BookingStep::AwaitingFood => {
                "Sounds great! What kind of food or catering would you like to have?"
            }
            BookingStep::AwaitingEmail => {
                "Excellent! Could you please provide a contact email so we can send \
                 confirmation?"
            }
            BookingStep::AwaitingPhone => "Thanks! And a phone number for quick contact?",
            BookingStep::AwaitingDecor => {
                "Got it. Would you like any specific decor or theme for the event?"
            }
            BookingStep::AwaitingExtras => {
                "Any other special requests or questions you'd like noted?"
            }
        }
    }
}

/// What the step machine decided for one turn.
#[derive(Clone, Debug, PartialEq)]
pub enum GuidedReply {
    /// Stream this fixed prompt; the session has advanced to the next step.
    Prompt(String),
    /// The message is not part of the booking flow; hand it to free-form
    /// assistant chat.
    FreeChat,
    /// The booking flow is closing. Stream the confirmation text, hand the
    /// record to persistence if complete, and reset the session.
    Closed {
        confirmation: String,
        booking: BookingRecord,
    },
}

/// Advance the session one step with the given (already cleaned) message.
///
/// Mutates the session's step, booking record, and last prompt in place.
/// The terminal step returns [`GuidedReply::Closed`]; the caller is
/// responsible for persistence and for resetting the session afterwards,
/// which happens regardless of persistence success.
pub fn advance(session: &mut Session, message: &str) -> GuidedReply {
    match session.step {
        BookingStep::Greeting => {
            if is_booking_intent(message) {
                ask(session, BookingStep::AwaitingDate)
            } else {
                ask(session, BookingStep::AwaitingIntent)
            }
        }

        BookingStep::AwaitingIntent => {
            if is_booking_intent(message) {
                ask(session, BookingStep::AwaitingDate)
            } else {
                GuidedReply::FreeChat
            }
        }

        BookingStep::AwaitingDate => {
            session.booking.date = Some(match parse_date(message) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => message.to_string(),
            });
            ask(session, BookingStep::AwaitingTime)
        }

        BookingStep::AwaitingTime => {
            if let Some((start, end)) = parse_time_range(message) {
                session.booking.start_time = Some(start);
                session.booking.end_time = Some(end);
            } else if let Some(single) = find_time(message) {
                session.booking.start_time = Some(single);
            } else {
                session.booking.start_time = Some(message.to_string());
            }
            ask(session, BookingStep::AwaitingPartySize)
        }

        BookingStep::AwaitingPartySize => {
            session.booking.party_size = PARTY_SIZE_RE
                .find(message)
                .and_then(|m| m.as_str().parse().ok());
            ask(session, BookingStep::AwaitingEventType)
        }

        BookingStep::AwaitingEventType => {
            session.booking.event_type = Some(message.to_string());
            ask(session, BookingStep::AwaitingFood)
        }

        BookingStep::AwaitingFood => {
            session.booking.food = Some(message.to_string());
            ask(session, BookingStep::AwaitingEmail)
        }

        BookingStep::AwaitingEmail => {
            session.booking.email = Some(
                EMAIL_RE
                    .find(message)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| message.to_string()),
            );
            ask(session, BookingStep::AwaitingPhone)
        }

        BookingStep::AwaitingPhone => {
            session.booking.phone = Some(
                PHONE_RE
                    .find(message)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| message.to_string()),
            );
            ask(session, BookingStep::AwaitingDecor)
        }

        BookingStep::AwaitingDecor => {
            session.booking.decor = Some(message.to_string());
            ask(session, BookingStep::AwaitingExtras)
        }

        BookingStep::AwaitingExtras => {
            if is_negation(message) {
                let confirmation = format!(
                    "Thanks! Here's a summary of your booking:\n\n{}\n\n\
                     We'll follow up to confirm.",
                    summarize(&session.booking)
                );
                GuidedReply::Closed {
                    confirmation,
                    booking: session.booking.clone(),
                }
            } else {
                session.booking.extras = Some(message.to_string());
                let confirmation = format!(
                    "Noted. I've added: \"{}\". We'll include that in your booking \
                     and follow up to confirm.",
                    message
                );
                GuidedReply::Closed {
                    confirmation,
                    booking: session.booking.clone(),
                }
            }
        }
    }
}

/// Move to `next` and surface its prompt.
fn ask(session: &mut Session, next: BookingStep) -> GuidedReply {
    let prompt = next.prompt().to_string();
    session.step = next;
    session.last_prompt = prompt.clone();
    GuidedReply::Prompt(prompt)
}

/// Human-readable booking summary shown at confirmation.
fn summarize(booking: &BookingRecord) -> String {
    let time = match (&booking.start_time, &booking.end_time) {
        (Some(s), Some(e)) => format!("{} - {}", s, e),
        (Some(s), None) => s.clone(),
        _ => "TBD".to_string(),
    };
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "TBD".to_string());

    [
        format!("📅 Date: {}", field(&booking.date)),
        format!("⏰ Time: {}", time),
        format!(
            "👥 Guests: {}",
            booking
                .party_size
                .map(|n| n.to_string())
                .unwrap_or_else(|| "TBD".to_string())
        ),
        format!("🎉 Event Type: {}", field(&booking.event_type)),
        format!("🍽 Food: {}", field(&booking.food)),
        format!("📧 Email: {}", field(&booking.email)),
        format!("📞 Phone: {}", field(&booking.phone)),
        format!(
            "🎈 Decor: {}",
            booking.decor.clone().unwrap_or_else(|| "None".to_string())
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn fresh() -> Session {
        Session::new(Uuid::new_v4())
    }

    /// Drive a fresh session up to the terminal step with a full set of
    /// answers.
    fn filled_session() -> Session {
        let mut s = fresh();
        advance(&mut s, "I want to book a birthday party");
        advance(&mut s, "2026-11-01");
        advance(&mut s, "6pm-9pm");
        advance(&mut s, "25 people");
        advance(&mut s, "Birthday Party");
        advance(&mut s, "pasta and pizza");
        advance(&mut s, "guest@example.com");
        advance(&mut s, "330-555-0199");
        advance(&mut s, "balloons");
        s
    }

    // ---- Greeting branch ----

    #[test]
    fn test_greeting_with_intent_jumps_to_date() {
        let mut s = fresh();
        let reply = advance(&mut s, "I want to book a birthday party");
        assert_eq!(s.step, BookingStep::AwaitingDate);
        assert!(matches!(reply, GuidedReply::Prompt(p) if p.contains("What date")));
    }

    #[test]
    fn test_greeting_without_intent_shows_greeting() {
        let mut s = fresh();
        let reply = advance(&mut s, "hello there");
        assert_eq!(s.step, BookingStep::AwaitingIntent);
        assert!(matches!(reply, GuidedReply::Prompt(p) if p.contains("banquet assistant")));
    }

    #[test]
    fn test_awaiting_intent_books_on_keyword() {
        let mut s = fresh();
        advance(&mut s, "hi");
        let reply = advance(&mut s, "I'd like to reserve a banquet");
        assert_eq!(s.step, BookingStep::AwaitingDate);
        assert!(matches!(reply, GuidedReply::Prompt(_)));
    }

    #[test]
    fn test_awaiting_intent_falls_back_to_free_chat() {
        let mut s = fresh();
        advance(&mut s, "hi");
        let reply = advance(&mut s, "what are your opening hours?");
        assert_eq!(reply, GuidedReply::FreeChat);
        assert_eq!(s.step, BookingStep::AwaitingIntent);
    }

    // ---- Field extraction per step ----

    #[test]
    fn test_date_step_parses_calendar_date() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "November 1st");
        let date = s.booking.date.clone().unwrap();
        assert!(date.ends_with("-11-01"), "got {date}");
        assert_eq!(s.step, BookingStep::AwaitingTime);
    }

    #[test]
    fn test_date_step_keeps_verbatim_on_parse_failure() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "sometime next fall");
        assert_eq!(s.booking.date.as_deref(), Some("sometime next fall"));
        assert_eq!(s.step, BookingStep::AwaitingTime);
    }

    #[test]
    fn test_time_step_takes_range() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "11/1");
        advance(&mut s, "6pm-9pm");
        assert_eq!(s.booking.start_time.as_deref(), Some("6pm"));
        assert_eq!(s.booking.end_time.as_deref(), Some("9pm"));
    }

    #[test]
    fn test_time_step_takes_single_time() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "11/1");
        advance(&mut s, "around 6pm");
        assert_eq!(s.booking.start_time.as_deref(), Some("6pm"));
        assert!(s.booking.end_time.is_none());
    }

    #[test]
    fn test_time_step_verbatim_fallback() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "11/1");
        advance(&mut s, "whenever works");
        assert_eq!(s.booking.start_time.as_deref(), Some("whenever works"));
    }

    #[test]
    fn test_party_size_extracts_number() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "11/1");
        advance(&mut s, "6pm");
        advance(&mut s, "about 25 people");
        assert_eq!(s.booking.party_size, Some(25));
    }

    #[test]
    fn test_party_size_unparseable_left_empty() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "11/1");
        advance(&mut s, "6pm");
        advance(&mut s, "a whole bunch");
        assert_eq!(s.booking.party_size, None);
        // Still advances; the record just stays incomplete.
        assert_eq!(s.step, BookingStep::AwaitingEventType);
    }

    #[test]
    fn test_email_extracted_from_sentence() {
        let s = filled_session();
        assert_eq!(s.booking.email.as_deref(), Some("guest@example.com"));
        assert_eq!(s.step, BookingStep::AwaitingExtras);
    }

    #[test]
    fn test_email_verbatim_fallback() {
        let mut s = fresh();
        advance(&mut s, "book a party");
        advance(&mut s, "11/1");
        advance(&mut s, "6pm");
        advance(&mut s, "25");
        advance(&mut s, "Birthday Party");
        advance(&mut s, "pizza");
        advance(&mut s, "I'll give it to you later");
        assert_eq!(
            s.booking.email.as_deref(),
            Some("I'll give it to you later")
        );
    }

    #[test]
    fn test_phone_extracted() {
        let s = filled_session();
        assert_eq!(s.booking.phone.as_deref(), Some("330-555-0199"));
    }

    // ---- Terminal step ----

    #[test]
    fn test_negation_closes_with_summary() {
        let mut s = filled_session();
        let reply = advance(&mut s, "no that's it");
        match reply {
            GuidedReply::Closed {
                confirmation,
                booking,
            } => {
                assert!(confirmation.contains("summary of your booking"));
                assert!(confirmation.contains("guest@example.com"));
                assert!(booking.is_complete());
                assert!(booking.extras.is_none());
            }
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[test]
    fn test_extras_recorded_then_closed() {
        let mut s = filled_session();
        let reply = advance(&mut s, "please set up a projector");
        match reply {
            GuidedReply::Closed {
                confirmation,
                booking,
            } => {
                assert!(confirmation.contains("projector"));
                assert_eq!(booking.extras.as_deref(), Some("please set up a projector"));
            }
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    // ---- End-to-end scenario ----

    #[test]
    fn test_full_walkthrough_produces_complete_booking() {
        let mut s = filled_session();
        let reply = advance(&mut s, "nope");
        let GuidedReply::Closed { booking, .. } = reply else {
            panic!("expected Closed");
        };
        assert!(booking.is_complete());
        assert_eq!(booking.date.as_deref(), Some("2026-11-01"));
        assert_eq!(booking.start_time.as_deref(), Some("6pm"));
        assert_eq!(booking.end_time.as_deref(), Some("9pm"));
        assert_eq!(booking.party_size, Some(25));
        assert_eq!(booking.event_type.as_deref(), Some("Birthday Party"));
        assert_eq!(booking.food.as_deref(), Some("pasta and pizza"));
        assert_eq!(booking.decor.as_deref(), Some("balloons"));
    }

    #[test]
    fn test_prompts_follow_question_order() {
        let mut s = fresh();
        let prompts: Vec<String> = [
            "book a banquet",
            "11/1",
            "6pm",
            "25",
            "Birthday Party",
            "pizza",
            "a@b.com",
            "330-555-0199",
            "none",
        ]
        .iter()
        .map(|msg| match advance(&mut s, msg) {
            GuidedReply::Prompt(p) => p,
            other => panic!("expected Prompt, got {other:?}"),
        })
        .collect();

        assert!(prompts[0].contains("What date"));
        assert!(prompts[1].contains("What time"));
        assert!(prompts[2].contains("How many guests"));
        assert!(prompts[3].contains("type of event"));
        assert!(prompts[4].contains("food or catering"));
        assert!(prompts[5].contains("contact email"));
        assert!(prompts[6].contains("phone number"));
        assert!(prompts[7].contains("decor or theme"));
        assert!(prompts[8].contains("special requests"));
    }

    #[test]
    fn test_last_prompt_tracked() {
        let mut s = fresh();
        advance(&mut s, "book a banquet");
        assert_eq!(s.last_prompt, BookingStep::AwaitingDate.prompt());
    }
}
