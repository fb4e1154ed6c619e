//! Text helpers shared by the detail page, dashboard cards and reports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Placeholder for a reading that was not reported.
pub const MISSING_READING: &str = "--";

/// Shown when a record has no timestamp at all.
pub const UNKNOWN_TIME: &str = "Unknown";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the timestamp shapes the monitoring API and date pickers produce.
///
/// Offsets are honoured when present; naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Human-readable timestamp; an unparsable value is shown as sent.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNKNOWN_TIME.to_string();
    };

    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

pub fn format_reading(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| MISSING_READING.to_string())
}

/// `Yes` / `No`, or `missing` when the device did not report.
pub fn fall_text(value: Option<bool>, missing: &'static str) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => missing,
    }
}
