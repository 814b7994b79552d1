//! Spreadsheet row appends.

use serde_json::json;

use maitred_core::types::BookingRecord;

use crate::error::GoogleError;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4";

/// Appends one row per completed booking to a spreadsheet range.
pub struct SheetSink {
    client: reqwest::Client,
    spreadsheet_id: String,
    range: String,
}

impl SheetSink {
    pub fn new(spreadsheet_id: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
        }
    }

    /// Append the booking as one row in fixed column order.
    pub async fn append_row(
        &self,
        access_token: &str,
        booking: &BookingRecord,
    ) -> Result<(), GoogleError> {
        if self.spreadsheet_id.is_empty() {
            return Err(GoogleError::InvalidBooking(
                "no spreadsheet_id configured".to_string(),
            ));
        }

        let url = format!(
            "{SHEETS_API}/spreadsheets/{}/values/{}:append?valueInputOption=RAW",
            self.spreadsheet_id, self.range
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({ "values": [booking_row(booking)] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::info!(spreadsheet_id = %self.spreadsheet_id, "Booking row appended");
        Ok(())
    }
}

/// The fixed column order of a booking row:
/// date, start, end, event type, party size, food, email, phone, decor, extras.
pub fn booking_row(booking: &BookingRecord) -> Vec<String> {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        field(&booking.date),
        field(&booking.start_time),
        field(&booking.end_time),
        field(&booking.event_type),
        booking
            .party_size
            .map(|n| n.to_string())
            .unwrap_or_default(),
        field(&booking.food),
        field(&booking.email),
        field(&booking.phone),
        booking.decor.clone().unwrap_or_else(|| "None".to_string()),
        booking.extras.clone().unwrap_or_else(|| "None".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> BookingRecord {
        BookingRecord {
            date: Some("2026-11-01".to_string()),
            start_time: Some("6pm".to_string()),
            end_time: Some("9pm".to_string()),
            party_size: Some(25),
            event_type: Some("Birthday Party".to_string()),
            food: Some("pasta".to_string()),
            email: Some("guest@example.com".to_string()),
            phone: Some("330-555-0199".to_string()),
            decor: Some("balloons".to_string()),
            extras: Some("projector".to_string()),
        }
    }

    #[test]
    fn test_row_column_order() {
        let row = booking_row(&booking());
        assert_eq!(
            row,
            vec![
                "2026-11-01",
                "6pm",
                "9pm",
                "Birthday Party",
                "25",
                "pasta",
                "guest@example.com",
                "330-555-0199",
                "balloons",
                "projector",
            ]
        );
    }

    #[test]
    fn test_row_defaults_for_missing_decor_and_extras() {
        let mut b = booking();
        b.decor = None;
        b.extras = None;
        let row = booking_row(&b);
        assert_eq!(row[8], "None");
        assert_eq!(row[9], "None");
    }

    #[test]
    fn test_row_empty_for_missing_core_fields() {
        let row = booking_row(&BookingRecord::default());
        assert_eq!(row[0], "");
        assert_eq!(row[4], "");
        assert_eq!(row.len(), 10);
    }
}
