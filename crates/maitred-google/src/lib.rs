//! Google Calendar and Sheets integration for maitred.
//!
//! Completed bookings are written to two independent sinks: one calendar
//! event and one appended spreadsheet row. Both writes are best-effort;
//! failure of either is logged and never blocks the other, and the user's
//! confirmation does not depend on them. The Google APIs themselves are
//! consumed over plain HTTP, never reimplemented.

pub mod calendar;
pub mod error;
pub mod oauth;
pub mod saver;
pub mod sheet;

pub use calendar::CalendarSink;
pub use error::GoogleError;
pub use oauth::TokenManager;
pub use saver::{BookingSaver, SaveOutcome};
pub use sheet::SheetSink;
