//! Scalar values extracted from statement text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::parse_number;

/// A value pulled out of statement text: numeric when it parses as a number
/// after separator stripping, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce a raw capture, preferring a numeric reading.
    pub fn coerce(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => FieldValue::Number(n),
            None => FieldValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_prefers_number() {
        assert_eq!(FieldValue::coerce("1,234.56"), FieldValue::Number(1234.56));
        assert_eq!(
            FieldValue::coerce("12/31/2024"),
            FieldValue::Text("12/31/2024".to_string())
        );
    }

    #[test]
    fn test_serializes_untagged() {
        let n = serde_json::to_string(&FieldValue::Number(48.0)).unwrap();
        assert_eq!(n, "48.0");
        let t = serde_json::to_string(&FieldValue::Text("04/22".into())).unwrap();
        assert_eq!(t, "\"04/22\"");
    }
}
