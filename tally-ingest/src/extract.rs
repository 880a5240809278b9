//! Pattern-driven record and field extraction.

use regex::Regex;
use tally_core::FieldValue;

use crate::formats::{compile_ci, RecordPattern, ScalarPattern, ValueType};
use crate::types::ExtractedTransaction;

const DATE_GROUP: usize = 1;
const DESCRIPTION_GROUP: usize = 2;
const AMOUNT_GROUP: usize = 3;

/// Extract transactions from isolated section lines.
///
/// Candidates are tried in declared order; each candidate is matched against
/// every line independently. The first candidate that produces any
/// transaction wins; later candidates are never tried. Exact duplicates
/// (same date, description, amount) are skipped. An empty result is a count
/// of zero, not an error.
pub fn extract_transactions(
    lines: &[String],
    candidates: &[&RecordPattern],
) -> Vec<ExtractedTransaction> {
    let mut transactions: Vec<ExtractedTransaction> = Vec::new();

    for candidate in candidates {
        let Ok(re) = Regex::new(&candidate.pattern) else {
            log::warn!("Skipping uncompilable transaction pattern: {}", candidate.pattern);
            continue;
        };

        for line in lines {
            let Some(transaction) = match_transaction(&re, candidate, line) else {
                continue;
            };
            if !transactions.contains(&transaction) {
                transactions.push(transaction);
            }
        }

        if !transactions.is_empty() {
            log::debug!(
                "Extracted {} transactions with pattern {}",
                transactions.len(),
                candidate.pattern
            );
            break;
        }
    }

    transactions
}

/// Match one line against one candidate. Any required group missing from
/// the match (including an index past the pattern's group count) means no
/// transaction for this line.
fn match_transaction(
    re: &Regex,
    candidate: &RecordPattern,
    line: &str,
) -> Option<ExtractedTransaction> {
    let caps = re.captures(line)?;

    let group = |name: &str, default: usize| -> Option<&str> {
        let index = candidate.groups.get(name).copied().unwrap_or(default);
        caps.get(index).map(|m| m.as_str())
    };

    let date = group("date", DATE_GROUP)?.to_string();
    let mut description = group("description", DESCRIPTION_GROUP)?.trim().to_string();
    let amount = group("amount", AMOUNT_GROUP)?.to_string();

    // group 0 is the whole match, not a location field
    if let Some(index) = candidate.groups.get("location").copied().filter(|&i| i > 0) {
        if let Some(location) = caps.get(index).map(|m| m.as_str().trim()) {
            if !location.is_empty() {
                description.push(' ');
                description.push_str(location);
            }
        }
    }

    Some(ExtractedTransaction {
        date,
        description,
        amount,
    })
}

/// Extract a scalar field with a single case-insensitive search over the
/// whole text. The configured capture group is trimmed and coerced per the
/// declared type; a numeric field that refuses to parse comes back as its
/// raw text rather than an error.
pub fn extract_field(text: &str, spec: &ScalarPattern) -> Option<FieldValue> {
    let re = compile_ci(&spec.pattern).ok()?;
    let caps = re.captures(text)?;
    let raw = caps.get(spec.group)?.as_str().trim();

    let value = match spec.value_type {
        Some(ValueType::Number) => FieldValue::coerce(raw),
        Some(ValueType::Date) | Some(ValueType::String) => FieldValue::Text(raw.to_string()),
        None => FieldValue::coerce(raw),
    };
    Some(value)
}
