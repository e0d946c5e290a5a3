//! Hard-coded regexes for the legacy single-pass extractor and text cleanup.
//!
//! Each list is tried in order; the first regex that matches wins.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amount patterns ("Amount 2,080.00", "₱2080.00", "2080.00 PHP")
    pub static ref LEGACY_AMOUNT: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:Amount|Total Amount Sent|Total)\s*[£₱]?\s*([0-9,]+\.?[0-9]*)").unwrap(),
        Regex::new(r"(?i)[£₱]\s*([0-9,]+\.?[0-9]*)").unwrap(),
        Regex::new(r"(?i)([0-9,]+\.?[0-9]*)\s*(?:PHP|php|Php)").unwrap(),
        Regex::new(r"(?i)Amount\s+([0-9,]+\.?[0-9]*)").unwrap(),
    ];

    // Reference numbers may be printed in space-separated groups
    pub static ref LEGACY_REFERENCE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:Ref No\.|Reference|Transaction|Ref)\s*([0-9\s]+)").unwrap(),
        Regex::new(r"(?i)Reference\s*[#:]?\s*([0-9\s]+)").unwrap(),
        Regex::new(r"(?i)Transaction\s*ID\s*[#:]?\s*([0-9\s]+)").unwrap(),
        Regex::new(r"(?i)Ref No\.\s*([0-9\s]+)").unwrap(),
    ];

    // "Aug 5, 2025 12:33 AM" or "08/05/2025 12:33"
    pub static ref LEGACY_DATE: Vec<Regex> = vec![
        Regex::new(r"(?i)([A-Za-z]{3}\s+[0-9]{1,2},\s+[0-9]{4}\s+[0-9]{1,2}:[0-9]{2}\s*[AP]M)").unwrap(),
        Regex::new(r"(?i)([0-9]{1,2}[/-][0-9]{1,2}[/-][0-9]{2,4}\s*[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?(?:\s*[AP]M)?)").unwrap(),
    ];

    // Philippine mobile numbers
    pub static ref LEGACY_PHONE: Vec<Regex> = vec![
        Regex::new(r"(?i)(\+63\s*[0-9]{3}\s*[0-9]{3}\s*[0-9]{4})").unwrap(),
        Regex::new(r"(?i)(09[0-9]{9})").unwrap(),
    ];

    pub static ref LEGACY_SENDER: Vec<Regex> = vec![
        Regex::new(r"(?i)From[:\s]+([A-Za-z\s]+?)(?:\n|$)").unwrap(),
        Regex::new(r"(?i)Sender[:\s]+([A-Za-z\s]+?)(?:\n|$)").unwrap(),
    ];

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Characters dropped before comparing account numbers
    pub static ref ACCOUNT_NUMBER_NOISE: Regex = Regex::new(r"[\s+\-()]").unwrap();

    // "12:33AM" -> "12:33 AM"
    pub static ref GLUED_MERIDIEM: Regex = Regex::new(r"(?i)(\d)\s*([ap]m)\b").unwrap();

    // "08-05-2025" style dates, rewritten with slashes before parsing
    pub static ref DASHED_MDY: Regex = Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{2,4})").unwrap();
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// First capture of the first regex in `patterns` that matches `text`.
pub fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
