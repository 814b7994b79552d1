//! Best-effort persistence of completed bookings.

use std::sync::Arc;

use maitred_core::types::BookingRecord;

use crate::calendar::CalendarSink;
use crate::oauth::TokenManager;
use crate::sheet::SheetSink;

/// What happened to each sink during a save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub calendar: bool,
    pub sheet: bool,
}

impl SaveOutcome {
    /// Whether at least one sink accepted the booking.
    pub fn any_succeeded(&self) -> bool {
        self.calendar || self.sheet
    }
}

/// Writes a completed booking to the calendar and the spreadsheet.
///
/// The two writes are independent: each failure is logged and does not
/// prevent the other, and the caller's user-facing confirmation is not
/// contingent on either. Incomplete records are never written.
pub struct BookingSaver {
    tokens: Arc<TokenManager>,
    calendar: CalendarSink,
    sheet: SheetSink,
    enabled: bool,
}

impl BookingSaver {
    pub fn new(
        tokens: Arc<TokenManager>,
        calendar: CalendarSink,
        sheet: SheetSink,
        enabled: bool,
    ) -> Self {
        Self {
            tokens,
            calendar,
            sheet,
            enabled,
        }
    }

    /// Attempt both writes, once each, and report per-sink outcomes.
    pub async fn save(&self, booking: &BookingRecord) -> SaveOutcome {
        if !booking.is_complete() {
            tracing::warn!("Refusing to persist incomplete booking");
            return SaveOutcome::default();
        }
        if !self.enabled {
            tracing::info!("Google persistence disabled, booking not written");
            return SaveOutcome::default();
        }

        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "No usable access token, booking not written");
                return SaveOutcome::default();
            }
        };

        let (calendar_result, sheet_result) = tokio::join!(
            self.calendar.insert_event(&token, booking),
            self.sheet.append_row(&token, booking),
        );

        let calendar = match calendar_result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Calendar insert failed");
                false
            }
        };
        let sheet = match sheet_result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Sheet append failed");
                false
            }
        };

        SaveOutcome { calendar, sheet }
    }
}
