//! Heuristic parsing for statements no config matches.

use tally_core::money::{bare_number_re, dollar_amount_re, parse_number, plausible_balance};
use tally_core::{dates, FieldValue};

use crate::statement::PortfolioStatement;

const FALLBACK_NOTE: &str = "Used fallback parsing due to unknown format";
const INVESTMENT_NOTE: &str = ". Detected as investment statement based on keywords.";

/// Vocabulary used to flag a probable investment statement.
const INVESTMENT_KEYWORDS: &[&str] = &[
    "portfolio",
    "securities",
    "holdings",
    "investment",
    "brokerage",
    "401k",
    "ira",
    "mutual fund",
    "stock",
    "bond",
];

/// Best-effort extraction when no format was detected.
///
/// Finds the first date-like substring, then scrapes dollar-like numbers in
/// the plausible balance range: the smallest is reported as the opening
/// balance and the largest as the ending balance. A pure heuristic, flagged
/// as such in `parsing_notes`.
pub fn parse(text: &str) -> PortfolioStatement {
    let mut statement = PortfolioStatement {
        format_detected: "Unknown (Fallback)".to_string(),
        parsing_notes: Some(FALLBACK_NOTE.to_string()),
        ..Default::default()
    };

    for pattern in dates::generic_date_patterns() {
        if let Some(found) = pattern.find(text) {
            log::debug!("Fallback found date: {}", found.as_str());
            statement.statement_date = Some(FieldValue::Text(found.as_str().to_string()));
            break;
        }
    }

    let mut amounts: Vec<f64> = Vec::new();
    for re in [dollar_amount_re(), bare_number_re()] {
        for caps in re.captures_iter(text) {
            if let Some(value) = caps.get(1).and_then(|m| parse_number(m.as_str())) {
                if plausible_balance(value) {
                    amounts.push(value);
                }
            }
        }
    }

    amounts.sort_by(f64::total_cmp);
    if amounts.len() >= 2 {
        log::debug!(
            "Fallback estimated balances from {} candidate amounts",
            amounts.len()
        );
        statement.opening_balance = Some(FieldValue::Number(amounts[0]));
        statement.ending_balance = Some(FieldValue::Number(amounts[amounts.len() - 1]));
    }

    let haystack = text.to_lowercase();
    let keyword_count = INVESTMENT_KEYWORDS
        .iter()
        .filter(|keyword| haystack.contains(*keyword))
        .count();
    if keyword_count >= 2 {
        if let Some(notes) = &mut statement.parsing_notes {
            notes.push_str(INVESTMENT_NOTE);
        }
    }

    statement
}
