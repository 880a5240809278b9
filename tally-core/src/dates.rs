//! Date shapes seen across statement text.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// The generic date shapes the fallback parser tries, in order: US numeric
/// (2- or 4-digit year), ISO, then long-form "Month DD, YYYY".
pub fn generic_date_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").expect("us date regex"),
            Regex::new(r"\d{4}-\d{2}-\d{2}").expect("iso date regex"),
            Regex::new(r"[A-Z][a-z]+ \d{1,2}, \d{4}").expect("long date regex"),
        ]
    })
}

/// Parse a statement date in any of the shapes providers print.
///
/// Returns `None` rather than guessing when no shape fits; callers keep the
/// raw string in that case.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}
