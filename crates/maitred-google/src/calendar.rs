//! Calendar event insertion.

use serde_json::json;

use maitred_chat::timeparse::{event_span, parse_date};
use maitred_core::types::BookingRecord;

use crate::error::GoogleError;

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Writes one event per completed booking into a Google calendar.
pub struct CalendarSink {
    client: reqwest::Client,
    calendar_id: String,
    time_zone: String,
}

impl CalendarSink {
    pub fn new(calendar_id: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            calendar_id: calendar_id.into(),
            time_zone: time_zone.into(),
        }
    }

    /// Insert the booking as a calendar event.
    pub async fn insert_event(
        &self,
        access_token: &str,
        booking: &BookingRecord,
    ) -> Result<(), GoogleError> {
        let payload = event_payload(booking, &self.time_zone)?;
        let url = format!(
            "{CALENDAR_API}/calendars/{}/events",
            urlencode(&self.calendar_id)
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&payload)
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

        tracing::info!(calendar_id = %self.calendar_id, "Calendar event created");
        Ok(())
    }
}

/// Build the event-insert payload from a booking.
///
/// The date may still be raw user phrasing at this point; it is parsed
/// here and an unparseable date makes the event unwritable (logged by the
/// caller, never surfaced to the user).
pub fn event_payload(
    booking: &BookingRecord,
    time_zone: &str,
) -> Result<serde_json::Value, GoogleError> {
    let date_text = booking
        .date
        .as_deref()
        .ok_or_else(|| GoogleError::InvalidBooking("missing date".to_string()))?;
    let date = parse_date(date_text)
        .ok_or_else(|| GoogleError::InvalidBooking(format!("unparseable date: {date_text}")))?;

    let (start, end) = event_span(
        date,
        booking.start_time.as_deref(),
        booking.end_time.as_deref(),
    );

    let summary = format!(
        "Banquet: {}",
        booking.event_type.as_deref().unwrap_or("Event")
    );
    let description = format!(
        "Customer: {}\nPhone: {}\nGuests: {}\nFood: {}",
        booking.email.as_deref().unwrap_or("N/A"),
        booking.phone.as_deref().unwrap_or("N/A"),
        booking
            .party_size
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        booking.food.as_deref().unwrap_or("Not specified"),
    );

    Ok(json!({
        "summary": summary,
        "description": description,
        "start": {
            "dateTime": start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": time_zone,
        },
        "end": {
            "dateTime": end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": time_zone,
        },
    }))
}

/// Percent-encode a calendar id for use as a path segment.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
