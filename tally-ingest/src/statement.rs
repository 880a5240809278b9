//! Bank and investment statement parsing.
//!
//! `StatementParser` drives the full pipeline for non-credit-card
//! statements: text extraction, format detection, scalar field extraction,
//! and section parsing (securities for investment statements, transactions
//! for banking statements). Unknown formats drop to the heuristic fallback
//! parser instead of failing.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tally_core::{parse_number, FieldValue};

use crate::detect::detect_format;
use crate::error::IngestError;
use crate::extract::{extract_field, extract_transactions};
use crate::fallback;
use crate::formats::{
    FormatKind, PatternSet, ProviderConfig, RecordPattern, ScalarPattern,
};
use crate::pdf_text;
use crate::registry::FormatRegistry;
use crate::section;
use crate::types::{ExtractedTransaction, Security};

/// Scalar fields an investment statement carries.
const INVESTMENT_FIELDS: &[&str] = &[
    "statement_date",
    "opening_balance",
    "ending_balance",
    "total_market_value",
    "total_cost_basis",
    "total_unrealized_gain_loss",
];

/// Security fields coerced to floats; a failed parse defaults the field to
/// `0.0` without dropping the record.
const SECURITY_NUMERIC_FIELDS: &[&str] = &[
    "quantity",
    "share_price",
    "total_cost",
    "market_value",
    "unrealized_gain_loss",
];

/// Parsed investment statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatement {
    pub statement_date: Option<FieldValue>,
    pub opening_balance: Option<FieldValue>,
    pub period_gain_loss: Option<f64>,
    pub ending_balance: Option<FieldValue>,
    pub total_market_value: Option<FieldValue>,
    pub total_cost_basis: Option<FieldValue>,
    pub total_unrealized_gain_loss: Option<FieldValue>,
    pub securities: Vec<Security>,
    pub format_detected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing_notes: Option<String>,
}

/// Parsed banking statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    pub statement_date: Option<FieldValue>,
    pub opening_balance: Option<FieldValue>,
    pub ending_balance: Option<FieldValue>,
    pub transactions: Vec<ExtractedTransaction>,
    pub format_detected: String,
}

/// Output of a statement parse. Serializes flat (no variant tag): consumers
/// see the same shape the parse produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedStatement {
    Investment(PortfolioStatement),
    Banking(BankStatement),
}

/// Configurable statement parser backed by a format registry.
///
/// The registry is owned and injected; a second, built-in tier of generic
/// investment patterns catches statements no specific config claims.
pub struct StatementParser {
    registry: FormatRegistry,
    generics: FormatRegistry,
}

impl StatementParser {
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            registry,
            generics: generic_registry(),
        }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Single-writer access for registering custom formats.
    pub fn registry_mut(&mut self) -> &mut FormatRegistry {
        &mut self.registry
    }

    /// Detect the statement format, preferring specific configs over the
    /// generic tier.
    pub fn detect(&self, text: &str) -> Option<String> {
        detect_format(text, &self.registry)
            .or_else(|| detect_format(text, &self.generics))
    }

    /// Extract text from a PDF and parse it.
    pub fn parse_file(
        &self,
        path: &Path,
        format_key: Option<&str>,
    ) -> Result<ParsedStatement, IngestError> {
        let text = pdf_text::extract_text(path)?;
        Ok(self.parse_text(&text, format_key))
    }

    /// Parse already-extracted statement text.
    ///
    /// Never errors: an unknown or unhandled format falls back to heuristic
    /// parsing, so callers always get a best-effort result.
    pub fn parse_text(&self, text: &str, format_key: Option<&str>) -> ParsedStatement {
        let key = format_key
            .map(str::to_string)
            .or_else(|| self.detect(text));

        if let Some(key) = &key {
            if let Some(config) = self.registry.get(key).or_else(|| self.generics.get(key)) {
                log::debug!("Parsing with format: {}", config.name);
                match config.kind {
                    FormatKind::Investment => {
                        return ParsedStatement::Investment(self.parse_investment(text, config));
                    }
                    FormatKind::Banking => {
                        return ParsedStatement::Banking(self.parse_banking(text, config));
                    }
                    // Credit-card configs belong to CreditCardParser; a
                    // statement registry carrying one drops to fallback.
                    FormatKind::CreditCard => {}
                }
            }
        }

        log::debug!("No statement format matched, using fallback parsing");
        ParsedStatement::Investment(fallback::parse(text))
    }

    fn parse_investment(&self, text: &str, config: &ProviderConfig) -> PortfolioStatement {
        let patterns = &config.patterns;
        let mut statement = PortfolioStatement {
            format_detected: config.name.clone(),
            ..Default::default()
        };

        for &field in INVESTMENT_FIELDS {
            let value = patterns
                .field(field)
                .and_then(|spec| extract_field(text, spec));
            match field {
                "statement_date" => statement.statement_date = value,
                "opening_balance" => statement.opening_balance = value,
                "ending_balance" => statement.ending_balance = value,
                "total_market_value" => statement.total_market_value = value,
                "total_cost_basis" => statement.total_cost_basis = value,
                "total_unrealized_gain_loss" => {
                    statement.total_unrealized_gain_loss = value;
                }
                _ => {}
            }
        }

        // Derive the period from the balance endpoints when both are real
        // numbers; a zero balance reads as "not found" here.
        if let (Some(opening), Some(ending)) = (
            number(&statement.opening_balance),
            number(&statement.ending_balance),
        ) {
            if opening != 0.0 && ending != 0.0 {
                statement.period_gain_loss = Some(ending - opening);
            }
        }

        if let (Some(boundary), Some(spec)) =
            (&patterns.securities_section, &patterns.security_line)
        {
            let lines = section::scan(text, boundary);
            statement.securities = parse_security_lines(&lines, spec);
            log::debug!("Parsed {} securities", statement.securities.len());
        }

        statement
    }

    fn parse_banking(&self, text: &str, config: &ProviderConfig) -> BankStatement {
        let patterns = &config.patterns;
        let mut statement = BankStatement {
            format_detected: config.name.clone(),
            ..Default::default()
        };

        statement.statement_date = scalar(patterns, text, "statement_date");
        statement.opening_balance = scalar(patterns, text, "opening_balance");
        statement.ending_balance = scalar(patterns, text, "ending_balance");

        if let Some(boundary) = &patterns.transactions_section {
            let lines = section::scan(text, boundary);
            let candidates = patterns.transaction_candidates();
            statement.transactions = extract_transactions(&lines, &candidates);
        }

        statement
    }
}

fn scalar(patterns: &PatternSet, text: &str, name: &str) -> Option<FieldValue> {
    patterns.field(name).and_then(|spec| extract_field(text, spec))
}

fn number(value: &Option<FieldValue>) -> Option<f64> {
    value.as_ref().and_then(FieldValue::as_number)
}

/// Parse securities lines with a single pattern.
///
/// Unlike transaction extraction there is no candidate escalation and no
/// deduplication: every matching line becomes one record.
pub fn parse_security_lines(lines: &[String], spec: &RecordPattern) -> Vec<Security> {
    let Ok(re) = Regex::new(&spec.pattern) else {
        log::warn!("Skipping uncompilable security pattern: {}", spec.pattern);
        return Vec::new();
    };

    lines
        .iter()
        .filter_map(|line| parse_security_line(&re, spec, line))
        .collect()
}

fn parse_security_line(re: &Regex, spec: &RecordPattern, line: &str) -> Option<Security> {
    let caps = re.captures(line)?;
    let mut security = Security::unknown();
    let mut any_field = false;

    for (field, &index) in &spec.groups {
        let Some(capture) = caps.get(index) else {
            continue;
        };
        let value = capture.as_str();
        any_field = true;

        if SECURITY_NUMERIC_FIELDS.contains(&field.as_str()) {
            let parsed = parse_number(value).unwrap_or(0.0);
            match field.as_str() {
                "quantity" => security.quantity = parsed,
                "share_price" => security.share_price = parsed,
                "total_cost" => security.total_cost = parsed,
                "market_value" => security.market_value = parsed,
                "unrealized_gain_loss" => security.unrealized_gain_loss = parsed,
                _ => {}
            }
        } else {
            match field.as_str() {
                "security_type" => security.security_type = value.to_string(),
                "symbol" => security.symbol = Some(value.to_string()),
                "description" => security.description = Some(value.to_string()),
                "statement_date" => security.statement_date = Some(value.to_string()),
                other => log::debug!("Ignoring unmapped security field '{other}'"),
            }
        }
    }

    any_field.then_some(security)
}

/// Built-in generic investment patterns, the fallback tier behind the
/// loaded registry.
fn generic_registry() -> FormatRegistry {
    let mut fields = HashMap::new();
    fields.insert(
        "statement_date".to_string(),
        ScalarPattern::new(
            r"(?:Statement Date|Date|Period|As of)[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        ),
    );
    fields.insert(
        "opening_balance".to_string(),
        ScalarPattern::new(
            r"(?:Beginning|Opening|Starting|Previous)[\s\w]*[Bb]alance[:\s]*\$?([-\d,]+\.?\d*)",
        ),
    );
    fields.insert(
        "ending_balance".to_string(),
        ScalarPattern::new(
            r"(?:Ending|Closing|Current|New)[\s\w]*[Bb]alance[:\s]*\$?([-\d,]+\.?\d*)",
        ),
    );
    fields.insert(
        "total_market_value".to_string(),
        ScalarPattern::new(
            r"(?:Total|Current)[\s\w]*[Mm]arket[:\s\w]*[Vv]alue[:\s]*\$?([-\d,]+\.?\d*)",
        ),
    );
    fields.insert(
        "total_cost_basis".to_string(),
        ScalarPattern::new(
            r"(?:Total|Current)[\s\w]*[Cc]ost[:\s\w]*[Bb]asis[:\s]*\$?([-\d,]+\.?\d*)",
        ),
    );
    fields.insert(
        "period_gain_loss".to_string(),
        ScalarPattern::new(
            r"(?:Period|Total|Net)[\s\w]*[Gg]ain[:\s\w]*[Ll]oss[:\s]*\$?([-\d,]+\.?\d*)",
        ),
    );

    let config = ProviderConfig {
        name: "Generic Investment Statement".to_string(),
        kind: FormatKind::Investment,
        keywords: [
            "portfolio",
            "securities",
            "holdings",
            "investment",
            "brokerage",
            "401k",
            "ira",
        ]
        .iter()
        .map(|k| k.to_string())
        .collect(),
        required_fields: vec![],
        patterns: PatternSet {
            fields,
            ..Default::default()
        },
    };

    let mut registry = FormatRegistry::default();
    registry.insert("generic_investment", config);
    registry
}
