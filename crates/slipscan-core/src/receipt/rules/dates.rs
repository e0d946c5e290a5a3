//! Date-time parsing for receipt timestamps.
//!
//! Receipts print local wall-clock time; no time zone is attached.

use chrono::{NaiveDate, NaiveDateTime};

use super::patterns::{collapse_whitespace, DASHED_MDY, GLUED_MERIDIEM};

/// Formats with a time component, in the order they are tried.
///
/// Two-digit year variants precede four-digit ones because `%Y` would
/// otherwise accept `25` as the year 25. `%b` only takes the three-letter
/// month, so every month-name format has a `%B` twin for "August".
const DATETIME_FORMATS: &[&str] = &[
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%b %d %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%d %b %Y %I:%M %p",
    "%d %B %Y %I:%M %p",
    "%b %d, %Y %H:%M",
    "%B %d, %Y %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only formats; the time defaults to midnight.
const DATE_FORMATS: &[&str] = &[
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y-%m-%d",
];

/// Parse a captured date string into a local date-time.
///
/// Accepts "Aug 5, 2025 12:33 AM", "08/05/2025 12:33", "08-05-25 9:05PM",
/// "2025-08-05 00:33" and date-only variants. Returns `None` when nothing
/// fits.
pub fn parse_receipt_datetime(raw: &str) -> Option<NaiveDateTime> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn normalize(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let spaced = GLUED_MERIDIEM.replace_all(&collapsed, "$1 $2");
    DASHED_MDY.replace(&spaced, "$1/$2/$3").into_owned()
}
