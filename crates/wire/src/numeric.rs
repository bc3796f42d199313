//! Loosely typed numeric fields.
//!
//! Stored payloads are not consistent about numbers: the interactive calculator historically
//! wrote `eGFR` as a string, bulk import wrote it as a number, and history views appended the
//! unit (`"76.6 ml/min/1.73m²"`).

use serde::{Deserialize, Serialize, Serializer};

/// A JSON number, or a string whose leading token is a number.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum NumericWire {
    Number(f64),
    Text(String),
}

impl NumericWire {
    /// Numeric value, taken from the first whitespace-separated token for text.
    pub(crate) fn value(&self) -> Option<f64> {
        match self {
            NumericWire::Number(n) => Some(*n).filter(|n| n.is_finite()),
            NumericWire::Text(text) => text
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<f64>().ok())
                .filter(|n| n.is_finite()),
        }
    }
}

/// Write whole-valued floats as JSON integers (`50` rather than `50.0`).
pub(crate) fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
