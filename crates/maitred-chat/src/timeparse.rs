//! Free-text time and date normalization.
//!
//! Converts user phrasing like "6pm", "6:30", "6pm-9pm", "November 1st"
//! into normalized wall-clock values. Unparseable input falls back to a
//! default rather than erroring; the conversation never fails on a bad
//! date.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

/// Value returned when a time fragment cannot be parsed at all.
pub const DEFAULT_TIME: &str = "00:00:00";

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").unwrap());

static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)\s*(?:-|–|to)\s*(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)",
    )
    .unwrap()
});

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").unwrap());

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?",
    )
    .unwrap()
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?(?:,?\s*(\d{4}))?",
    )
    .unwrap()
});

/// Normalize a free-text time fragment to a zero-padded `HH:MM:SS` string.
///
/// Parses a leading hour, optional `:MM`, optional am/pm marker. "pm" adds
/// twelve below noon; "12am" maps to midnight. Hours without a meridiem
/// are read as 24-hour values. Missing or unparseable input yields
/// [`DEFAULT_TIME`].
pub fn normalize_time(input: &str) -> String {
    let Some(caps) = TIME_RE.captures(input.trim()) else {
        return DEFAULT_TIME.to_string();
    };

    let mut hour: u32 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let minute: u32 = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let meridiem = caps.get(3).map(|m| m.as_str().to_lowercase());

    match meridiem.as_deref() {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    if hour > 23 || minute > 59 {
        return DEFAULT_TIME.to_string();
    }

    format!("{:02}:{:02}:00", hour, minute)
}

/// Split an explicit "A-B" range ("6pm-9pm", "6 to 9pm") into its raw
/// start and end fragments. Returns `None` when no range is present.
pub fn parse_time_range(input: &str) -> Option<(String, String)> {
    let caps = TIME_RANGE_RE.captures(input)?;
    Some((
        caps.get(1)?.as_str().trim().to_string(),
        caps.get(2)?.as_str().trim().to_string(),
    ))
}

/// Find a single time fragment ("6pm", "18:30") in free text, returning
/// the raw matched slice. Used when the user answers the time question
/// without an explicit range.
pub fn find_time(input: &str) -> Option<String> {
    TIME_RE.find(input).map(|m| m.as_str().trim().to_string())
}

/// Parse a free-text calendar date relative to today (local time).
///
/// See [`parse_date_from`] for the accepted forms and the forward-date
/// rule.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    parse_date_from(input, chrono::Local::now().date_naive())
}

/// Parse a free-text calendar date relative to the given `today`.
///
/// Accepts `YYYY-MM-DD`, `M/D` and `M/D/YYYY`, month-name forms
/// ("November 1st", "Nov 1, 2025") and day-first forms ("1st of November").
/// When no year is stated and the parsed date falls before `today`, the
/// date is advanced one year (assume the next occurrence).
pub fn parse_date_from(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_RE.captures(input) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = SLASH_DATE_RE.captures(input) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = caps.get(3).and_then(|m| parse_year(m.as_str()));
        return build_date(year, month, day, today);
    }

    if let Some(caps) = MONTH_DAY_RE.captures(input) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year = caps.get(3).and_then(|m| parse_year(m.as_str()));
        return build_date(year, month, day, today);
    }

    if let Some(caps) = DAY_MONTH_RE.captures(input) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = caps.get(3).and_then(|m| parse_year(m.as_str()));
        return build_date(year, month, day, today);
    }

    None
}

/// Compose a full event span from a date and raw start/end fragments.
///
/// Missing fragments default to a noon start and a one o'clock end. If
/// the computed end is not strictly after the start, the end is forced to
/// start plus one hour.
pub fn event_span(
    date: NaiveDate,
    start: Option<&str>,
    end: Option<&str>,
) -> (NaiveDateTime, NaiveDateTime) {
    let start_hms = normalize_time(start.unwrap_or("12:00"));
    let end_hms = normalize_time(end.unwrap_or("13:00"));

    let start_time =
        NaiveTime::parse_from_str(&start_hms, "%H:%M:%S").unwrap_or(NaiveTime::MIN);
    let end_time = NaiveTime::parse_from_str(&end_hms, "%H:%M:%S").unwrap_or(NaiveTime::MIN);

    let start_dt = date.and_time(start_time);
    let mut end_dt = date.and_time(end_time);
    if end_dt <= start_dt {
        end_dt = start_dt + Duration::hours(1);
    }
    (start_dt, end_dt)
}

fn build_date(year: Option<i32>, month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(y) => NaiveDate::from_ymd_opt(y, month, day),
        None => {
            let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if candidate < today {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            } else {
                Some(candidate)
            }
        }
    }
}

fn parse_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    // Two-digit years are read as 20xx.
    Some(if y < 100 { 2000 + y } else { y })
}

fn month_number(prefix: &str) -> Option<u32> {
    match prefix.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}
