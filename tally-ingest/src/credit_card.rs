//! Credit-card statement parsing and import formatting.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tally_core::{FieldValue, ImportTransaction};

use crate::detect::detect_provider;
use crate::error::IngestError;
use crate::extract::{extract_field, extract_transactions};
use crate::formats::PatternSet;
use crate::pdf_text;
use crate::registry::FormatRegistry;
use crate::section;
use crate::types::ExtractedTransaction;

/// Parsed credit-card statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditCardStatement {
    pub statement_date: Option<FieldValue>,
    pub payment_due_date: Option<FieldValue>,
    pub new_balance: Option<FieldValue>,
    pub minimum_payment_due: Option<FieldValue>,
    pub transactions: Vec<ExtractedTransaction>,
    pub total_transactions: usize,
    pub provider: String,
    pub provider_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
}

impl CreditCardStatement {
    /// Whether a required field came out of extraction non-empty.
    fn has_field(&self, field: &str) -> bool {
        match field {
            "statement_date" => self.statement_date.is_some(),
            "payment_due_date" => self.payment_due_date.is_some(),
            "new_balance" => self.new_balance.is_some(),
            "minimum_payment_due" => self.minimum_payment_due.is_some(),
            "transactions" => !self.transactions.is_empty(),
            _ => false,
        }
    }
}

/// Import-ready reshaping of a parsed statement: the shape the storage
/// layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub provider: String,
    pub statement_date: String,
    pub payment_due_date: String,
    pub new_balance: String,
    pub minimum_payment_due: String,
    pub total_transactions: usize,
    pub transactions: Vec<ImportTransaction>,
    pub import_fields: Vec<String>,
    pub warnings: String,
    pub provider_key: String,
}

/// Credit-card statement parser backed by a provider registry.
pub struct CreditCardParser {
    registry: FormatRegistry,
}

impl CreditCardParser {
    pub fn new(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Single-writer access for registering custom providers.
    pub fn registry_mut(&mut self) -> &mut FormatRegistry {
        &mut self.registry
    }

    /// Extract text from a PDF and parse it.
    pub fn parse_file(&self, path: &Path) -> Result<CreditCardStatement, IngestError> {
        let text = pdf_text::extract_text(path)?;
        Ok(self.parse_text(&text))
    }

    /// Parse already-extracted statement text.
    ///
    /// Never fails: an unknown provider produces a statement with whatever
    /// the generic sentinel's (possibly empty) patterns recover, plus
    /// validation warnings.
    pub fn parse_text(&self, text: &str) -> CreditCardStatement {
        let provider_key = detect_provider(text, &self.registry);
        let config = self.registry.get(&provider_key);
        let provider = config
            .map(|c| c.name.clone())
            .unwrap_or_else(|| provider_key.clone());
        log::debug!("Parsing credit-card statement as: {provider}");

        let empty = PatternSet::default();
        let patterns = config.map(|c| &c.patterns).unwrap_or(&empty);

        let transactions = self.extract_statement_transactions(text, patterns);
        let mut statement = CreditCardStatement {
            statement_date: scalar(patterns, text, "statement_date", None),
            payment_due_date: scalar(patterns, text, "payment_due_date", Some("due_date")),
            new_balance: scalar(patterns, text, "new_balance", Some("ending_balance")),
            minimum_payment_due: scalar(
                patterns,
                text,
                "minimum_payment_due",
                Some("minimum_payment"),
            ),
            total_transactions: transactions.len(),
            transactions,
            provider,
            provider_key,
            warnings: None,
        };

        if let Some(config) = config {
            statement.warnings = missing_required(&statement, &config.required_fields);
        }
        statement
    }

    fn extract_statement_transactions(
        &self,
        text: &str,
        patterns: &PatternSet,
    ) -> Vec<ExtractedTransaction> {
        let Some(boundary) = &patterns.transactions_section else {
            return Vec::new();
        };
        let lines = section::scan(text, boundary);
        log::debug!("Found {} candidate transaction lines", lines.len());

        let candidates = patterns.transaction_candidates();
        extract_transactions(&lines, &candidates)
    }
}

/// Scalar field lookup honoring a legacy field name.
fn scalar(
    patterns: &PatternSet,
    text: &str,
    name: &str,
    legacy: Option<&str>,
) -> Option<FieldValue> {
    let spec = match legacy {
        Some(legacy) => patterns.field_or(name, legacy),
        None => patterns.field(name),
    };
    spec.and_then(|spec| extract_field(text, spec))
}

fn missing_required(statement: &CreditCardStatement, required: &[String]) -> Option<String> {
    let missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|field| !statement.has_field(field))
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("Missing required fields: {}", missing.join(", ")))
    }
}

/// Reshape a parsed statement for the import/storage layer.
pub fn format_for_import(statement: &CreditCardStatement) -> ImportSummary {
    let transactions = statement
        .transactions
        .iter()
        .map(|t| {
            ImportTransaction::credit_card(t.date.as_str(), t.description.as_str(), t.amount.as_str())
        })
        .collect();

    ImportSummary {
        provider: statement.provider.clone(),
        statement_date: render(&statement.statement_date, ""),
        payment_due_date: render(&statement.payment_due_date, ""),
        new_balance: render(&statement.new_balance, "0"),
        minimum_payment_due: render(&statement.minimum_payment_due, "0"),
        total_transactions: statement.total_transactions,
        transactions,
        import_fields: ["date", "description", "amount"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
        warnings: statement.warnings.clone().unwrap_or_default(),
        provider_key: statement.provider_key.clone(),
    }
}

fn render(value: &Option<FieldValue>, default: &str) -> String {
    value
        .as_ref()
        .map(FieldValue::to_string)
        .unwrap_or_else(|| default.to_string())
}
