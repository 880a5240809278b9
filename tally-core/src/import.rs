//! Normalized records handed to the storage layer.

use serde::{Deserialize, Serialize};

/// One transaction in the shape the import layer stores.
///
/// Dates and amounts stay as the strings the pattern captured; the storage
/// layer owns any further normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportTransaction {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ImportTransaction {
    /// Build a credit-card import record with the default category.
    pub fn credit_card(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            category: "Uncategorized".to_string(),
            kind: "credit_card_transaction".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_card_record_defaults() {
        let t = ImportTransaction::credit_card("12/16", "Ultra Pure Water", "48.00");
        assert_eq!(t.category, "Uncategorized");
        assert_eq!(t.kind, "credit_card_transaction");
    }

    #[test]
    fn test_type_field_name_on_wire() {
        let t = ImportTransaction::credit_card("12/16", "Ultra Pure Water", "48.00");
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"type\":\"credit_card_transaction\""));
    }
}
