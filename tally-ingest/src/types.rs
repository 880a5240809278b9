//! Structured records the extraction engine produces.

use serde::{Deserialize, Serialize};

/// One transaction pulled out of a statement line.
///
/// Fields keep the exact text the pattern captured; equality over the full
/// (date, description, amount) triple is what the extractor dedups on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    pub date: String,
    pub description: String,
    pub amount: String,
}

/// One securities position parsed from an investment statement line.
///
/// Numeric fields default to `0.0` when the capture fails to parse; a
/// coercion failure on one field never drops the record. Duplicate positions
/// are allowed: the same symbol can legitimately appear across statement
/// dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub security_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: f64,
    pub share_price: f64,
    pub total_cost: f64,
    pub market_value: f64,
    pub unrealized_gain_loss: f64,
    pub statement_date: Option<String>,
}

impl Security {
    /// A security with no fields set yet and the default type.
    pub fn unknown() -> Self {
        Self {
            security_type: "Unknown".to_string(),
            ..Self::default()
        }
    }
}
