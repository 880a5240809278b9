//! Provider format configurations.
//!
//! Each provider (bank, card issuer, brokerage) is described by a JSON
//! config naming detection keywords and the regex patterns used to pull
//! scalar fields and transaction lines out of extracted statement text.
//! Configs are validated when loaded so a bad regex surfaces as a load
//! warning instead of failing deep inside matching.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::IngestError;

/// Statement family a provider config applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Investment,
    Banking,
    CreditCard,
}

/// Declared coercion for a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Date,
    String,
}

/// Scalar field spec: one regex, one capture group, optional coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarPattern {
    pub pattern: String,
    #[serde(default = "default_group")]
    pub group: usize,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_group() -> usize {
    1
}

impl ScalarPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            group: 1,
            value_type: None,
            description: None,
        }
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }
}

/// Transaction/security line spec: one regex plus named group indices.
///
/// Group names the extractor understands: `date`, `description`, `amount`,
/// `location` for transactions (defaulting to groups 1/2/3 when unnamed),
/// and the security field names for securities lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPattern {
    pub pattern: String,
    #[serde(default)]
    pub groups: HashMap<String, usize>,
}

impl RecordPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            groups: HashMap::new(),
        }
    }

    pub fn with_group(mut self, name: impl Into<String>, index: usize) -> Self {
        self.groups.insert(name.into(), index);
        self
    }
}

/// Start/end markers delimiting a transaction or securities block.
///
/// Markers match a line case-insensitively, as a substring or as a regex.
/// `header_pattern` is the legacy single-marker spelling used by investment
/// configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBoundary {
    #[serde(
        default,
        alias = "header_pattern",
        deserialize_with = "string_or_seq"
    )]
    pub start_patterns: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub end_patterns: Vec<String>,
}

impl SectionBoundary {
    pub fn new<S: Into<String>>(
        start_patterns: impl IntoIterator<Item = S>,
        end_patterns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            start_patterns: start_patterns.into_iter().map(Into::into).collect(),
            end_patterns: end_patterns.into_iter().map(Into::into).collect(),
        }
    }
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(marker) => vec![marker],
        OneOrMany::Many(markers) => markers,
    })
}

/// The full pattern table for one provider.
///
/// Reserved entries (sections, transaction/security lines) are typed fields;
/// everything else in the JSON `patterns` object is a scalar field keyed by
/// its field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions_section: Option<SectionBoundary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub securities_section: Option<SectionBoundary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_line: Option<RecordPattern>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_transaction_patterns: Vec<RecordPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_line: Option<RecordPattern>,
    #[serde(flatten)]
    pub fields: HashMap<String, ScalarPattern>,
}

impl PatternSet {
    /// Scalar spec for `name`, or `None` when the provider doesn't define it.
    pub fn field(&self, name: &str) -> Option<&ScalarPattern> {
        self.fields.get(name)
    }

    /// Scalar spec for `name`, falling back to a legacy field name.
    pub fn field_or(&self, name: &str, legacy: &str) -> Option<&ScalarPattern> {
        self.fields.get(name).or_else(|| self.fields.get(legacy))
    }

    /// The primary transaction pattern followed by the alternatives, in
    /// declared order.
    pub fn transaction_candidates(&self) -> Vec<&RecordPattern> {
        self.transaction_line
            .iter()
            .chain(self.alternative_transaction_patterns.iter())
            .collect()
    }
}

/// One provider's detection keywords and extraction patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FormatKind,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub patterns: PatternSet,
}

impl ProviderConfig {
    /// Check every regex in the config compiles.
    pub fn validate(&self) -> Result<(), IngestError> {
        for (field, spec) in &self.patterns.fields {
            compile_ci(&spec.pattern)
                .map_err(|e| IngestError::Config(format!("field '{field}': {e}")))?;
        }
        for candidate in self.patterns.transaction_candidates() {
            Regex::new(&candidate.pattern)
                .map_err(|e| IngestError::Config(format!("transaction pattern: {e}")))?;
        }
        if let Some(spec) = &self.patterns.security_line {
            Regex::new(&spec.pattern)
                .map_err(|e| IngestError::Config(format!("security pattern: {e}")))?;
        }
        Ok(())
    }
}

/// Compile a pattern case-insensitively (detection and scalar fields match
/// statement text regardless of case).
pub(crate) fn compile_ci(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_set_splits_reserved_and_scalar_entries() {
        let json = r#"{
            "transactions_section": {
                "start_patterns": ["PURCHASES"],
                "end_patterns": ["Total fees"]
            },
            "transaction_line": {
                "pattern": "(\\d{1,2}/\\d{1,2})\\s+(.+?)\\s+([\\d,]+\\.\\d{2})",
                "groups": {"date": 1, "description": 2, "amount": 3}
            },
            "new_balance": {
                "pattern": "New Balance:\\s*\\$?([\\d,]+\\.\\d{2})",
                "type": "number"
            }
        }"#;
        let patterns: PatternSet = serde_json::from_str(json).unwrap();
        assert!(patterns.transactions_section.is_some());
        assert_eq!(patterns.transaction_candidates().len(), 1);
        assert_eq!(
            patterns.field("new_balance").unwrap().value_type,
            Some(ValueType::Number)
        );
        assert!(patterns.field("opening_balance").is_none());
    }

    #[test]
    fn test_header_pattern_alias_becomes_start_marker() {
        let json = r#"{
            "header_pattern": "Your Holdings",
            "end_patterns": ["Total Portfolio"]
        }"#;
        let boundary: SectionBoundary = serde_json::from_str(json).unwrap();
        assert_eq!(boundary.start_patterns, vec!["Your Holdings"]);
        assert_eq!(boundary.end_patterns, vec!["Total Portfolio"]);
    }

    #[test]
    fn test_scalar_group_defaults_to_one() {
        let spec: ScalarPattern =
            serde_json::from_str(r#"{"pattern": "Date: (\\S+)"}"#).unwrap();
        assert_eq!(spec.group, 1);
        assert_eq!(spec.value_type, None);
    }

    #[test]
    fn test_validate_rejects_bad_regex() {
        let mut config = ProviderConfig {
            name: "Broken".into(),
            kind: FormatKind::Banking,
            keywords: vec![],
            required_fields: vec![],
            patterns: PatternSet::default(),
        };
        config
            .patterns
            .fields
            .insert("bad".into(), ScalarPattern::new("([unclosed"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_field_or_prefers_current_name() {
        let mut patterns = PatternSet::default();
        patterns
            .fields
            .insert("due_date".into(), ScalarPattern::new("legacy"));
        patterns
            .fields
            .insert("payment_due_date".into(), ScalarPattern::new("current"));
        assert_eq!(
            patterns.field_or("payment_due_date", "due_date").unwrap().pattern,
            "current"
        );
        patterns.fields.remove("payment_due_date");
        assert_eq!(
            patterns.field_or("payment_due_date", "due_date").unwrap().pattern,
            "legacy"
        );
    }
}
