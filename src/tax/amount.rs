//! Lenient numeric values as they come back from the model.
//!
//! The model is asked for numbers but occasionally answers with strings such
//! as `"50,000"` or `"Rs. 1,200"`. Document amounts keep whatever was sent
//! ([`Amount::Raw`]) and only interpret it when arithmetic is needed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tax::lenient::scalar_text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Raw(Value),
}

impl Amount {
    /// Numeric reading of the amount, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Number(_) => None,
            Self::Raw(Value::String(text)) => parse_numeric(text),
            Self::Raw(Value::Number(number)) => number.as_f64(),
            Self::Raw(_) => None,
        }
    }

    /// Value used in arithmetic; anything unreadable counts as zero.
    pub fn value(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Reads `"1,50,000"`, `"Rs. 2,500.50"`, `"₹ 800"` and plain numerals.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    for prefix in ["Rs.", "Rs", "INR", "₹"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
            break;
        }
    }
    let cleaned: String = text
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Serde helper: numbers and numeric strings become `Some`, everything else `None`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_numeric(&text),
        _ => None,
    }))
}

/// Serde helper: strings pass through, scalars are stringified, the rest is absent.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_indian_grouping_and_prefixes() {
        assert_eq!(parse_numeric("1,50,000"), Some(150000.0));
        assert_eq!(parse_numeric("Rs. 2,500.50"), Some(2500.5));
        assert_eq!(parse_numeric("₹ 800"), Some(800.0));
        assert_eq!(parse_numeric("n/a"), None);
        assert_eq!(parse_numeric("   "), None);
    }

    #[test]
    fn raw_amounts_keep_their_original_value() {
        let amount: Amount = serde_json::from_str("\"50,000\"").expect("raw amount");
        assert_eq!(amount, Amount::Raw(Value::String("50,000".to_string())));
        assert_eq!(amount.value(), 50000.0);

        let opaque: Amount = serde_json::from_str("{\"x\":1}").expect("object amount");
        assert_eq!(opaque.as_number(), None);
        assert_eq!(opaque.value(), 0.0);
    }
}
