//! Timestamp helpers for the soft-delete marker.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Current UTC time as an ISO-8601 string with millisecond precision
/// (`2024-03-01T10:00:00.000Z`).
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a server timestamp. Offset-less values are read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
