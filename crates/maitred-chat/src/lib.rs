//! Conversational core for maitred.
//!
//! Provides text cleaning, time/date normalization, booking intent
//! detection, the guided booking step machine, and the session model.
//! Everything here is pure logic with no I/O, so the flow is unit-testable
//! independently of HTTP plumbing and external services.

pub mod clean;
pub mod intent;
pub mod session;
pub mod steps;
pub mod timeparse;

pub use clean::{clean_text, normalize_whitespace};
pub use intent::{is_booking_intent, is_negation};
pub use session::Session;
pub use steps::{advance, BookingStep, GuidedReply};
pub use timeparse::{event_span, normalize_time, parse_date, parse_time_range};
