//! Amount parsing helpers shared by the statement parsers.

use std::sync::OnceLock;

use regex::Regex;

/// Smallest amount the fallback parser treats as a plausible balance.
pub const MIN_PLAUSIBLE_BALANCE: f64 = 100.0;
/// Largest amount the fallback parser treats as a plausible balance.
pub const MAX_PLAUSIBLE_BALANCE: f64 = 10_000_000.0;

/// Parse an amount string, stripping thousands separators.
///
/// `"1,234.56"` → `1234.56`. Returns `None` when the remainder is not a
/// number.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse().ok()
}

/// True when `value` sits in the range a statement balance could occupy.
pub fn plausible_balance(value: f64) -> bool {
    (MIN_PLAUSIBLE_BALANCE..=MAX_PLAUSIBLE_BALANCE).contains(&value)
}

/// Dollar-prefixed amount, e.g. `$1,234.56`. The capture excludes the `$`.
pub fn dollar_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([\d,]+\.?\d*)").expect("dollar amount regex"))
}

/// Bare numeric token, e.g. `1,234.56` or `500`.
pub fn bare_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([\d,]+\.?\d*)").expect("bare number regex"))
}
