//! Format detection.
//!
//! Two distinct strategies: bank/investment statements use a
//! first-qualifying-match walk, credit-card statements use a best-score
//! walk. The two diverge on configs with overlapping keywords: first-match
//! follows declaration order, best-score picks the true maximum. Do not
//! merge them.

use crate::formats::{compile_ci, ProviderConfig};
use crate::registry::FormatRegistry;

/// Sentinel returned by [`detect_provider`] when no config scores a hit.
pub const GENERIC_CREDIT_CARD: &str = "generic_credit_card";

/// A config qualifies when at least this many keywords appear in the text.
const KEYWORD_THRESHOLD: usize = 2;
/// ...or when at least this many of its scalar patterns match.
const PATTERN_THRESHOLD: usize = 2;

/// First-qualifying-match detection.
///
/// Walks configs in registry (load) order and returns the first whose
/// keyword or scalar-pattern score clears its threshold. Later configs are
/// never scored once one qualifies.
pub fn detect_format(text: &str, registry: &FormatRegistry) -> Option<String> {
    for (key, config) in registry.iter() {
        if matches_format(text, config) {
            log::debug!("Detected format: {key}");
            return Some(key.to_string());
        }
    }
    None
}

/// Best-score detection.
///
/// Scores every config by keyword hits and returns the strict maximum, ties
/// going to the earlier-loaded config. Zero hits everywhere falls back to
/// [`GENERIC_CREDIT_CARD`].
pub fn detect_provider(text: &str, registry: &FormatRegistry) -> String {
    let mut best: Option<&str> = None;
    let mut best_score = 0;

    for (key, config) in registry.iter() {
        let score = keyword_hits(text, &config.keywords);
        if score > best_score {
            best_score = score;
            best = Some(key);
        }
    }

    let key = best.unwrap_or(GENERIC_CREDIT_CARD);
    log::debug!("Detected provider: {key} ({best_score} keyword hits)");
    key.to_string()
}

/// True when `config` clears either detection threshold against `text`.
fn matches_format(text: &str, config: &ProviderConfig) -> bool {
    if keyword_hits(text, &config.keywords) >= KEYWORD_THRESHOLD {
        return true;
    }
    let pattern_hits = config
        .patterns
        .fields
        .values()
        .filter(|spec| {
            compile_ci(&spec.pattern)
                .map(|re| re.is_match(text))
                .unwrap_or(false)
        })
        .count();
    pattern_hits >= PATTERN_THRESHOLD
}

/// Count keywords present in `text` as case-insensitive substrings.
pub(crate) fn keyword_hits(text: &str, keywords: &[String]) -> usize {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .count()
}
