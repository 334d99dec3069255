use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Canonical Types
// ============================================================================

/// Target scalar type of an output column.
///
/// This is the closed set of types the engine ever emits. Serializes to
/// lowercase names (`"string"`, `"bigdecimal"`, ...) as used by the field
/// configuration format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    /// Universal fallback; every native value has a textual form.
    #[default]
    String,
    Boolean,
    Integer,
    Number,
    BigDecimal,
    Date,
    Binary,
}

impl CanonicalType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::String => "string",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Integer => "integer",
            CanonicalType::Number => "number",
            CanonicalType::BigDecimal => "bigdecimal",
            CanonicalType::Date => "date",
            CanonicalType::Binary => "binary",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Canonical Values
// ============================================================================

/// One resolved output cell.
///
/// `Null` is the normal outcome for absent leaves (null value, out-of-range
/// index, missing map key, shape mismatch), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanonicalValue {
    Null,
    String(String),
    Boolean(bool),
    Integer(i64),
    Number(f64),
    BigDecimal(Decimal),
    Date(DateTime<Utc>),
    Binary(Vec<u8>),
}

impl CanonicalValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CanonicalValue::Null)
    }

    /// The canonical type this value inhabits; `None` for null.
    pub fn type_of(&self) -> Option<CanonicalType> {
        match self {
            CanonicalValue::Null => None,
            CanonicalValue::String(_) => Some(CanonicalType::String),
            CanonicalValue::Boolean(_) => Some(CanonicalType::Boolean),
            CanonicalValue::Integer(_) => Some(CanonicalType::Integer),
            CanonicalValue::Number(_) => Some(CanonicalType::Number),
            CanonicalValue::BigDecimal(_) => Some(CanonicalType::BigDecimal),
            CanonicalValue::Date(_) => Some(CanonicalType::Date),
            CanonicalValue::Binary(_) => Some(CanonicalType::Binary),
        }
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalValue::Null => f.write_str("null"),
            CanonicalValue::String(s) => f.write_str(s),
            CanonicalValue::Boolean(b) => write!(f, "{b}"),
            CanonicalValue::Integer(i) => write!(f, "{i}"),
            CanonicalValue::Number(n) => write!(f, "{n}"),
            CanonicalValue::BigDecimal(d) => write!(f, "{d}"),
            CanonicalValue::Date(d) => f.write_str(&d.to_rfc3339()),
            CanonicalValue::Binary(b) => {
                f.write_str(&String::from_utf8_lossy(b))
            }
        }
    }
}

/// One output row, cells in configured field order.
pub type Row = Vec<CanonicalValue>;
