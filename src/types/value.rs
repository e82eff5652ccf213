//! Single-value container used by constants and row-level inspection.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::EvalType;

/// Runtime value container for one row of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer value.
    Int(i64),
    /// 64-bit floating point value.
    Real(f64),
    /// Decimal value.
    Decimal(BigDecimal),
    /// Byte string value. Not required to be valid UTF-8.
    Bytes(Vec<u8>),
}

impl Datum {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Returns the evaluation type of this value, or None for Null.
    #[must_use]
    pub fn eval_type(&self) -> Option<EvalType> {
        match self {
            Datum::Null => None,
            Datum::Int(_) => Some(EvalType::Int),
            Datum::Real(_) => Some(EvalType::Real),
            Datum::Decimal(_) => Some(EvalType::Decimal),
            Datum::Bytes(_) => Some(EvalType::String),
        }
    }

    /// Attempts to extract an i64 value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Datum::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Datum::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a decimal reference.
    #[must_use]
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Datum::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Attempts to extract raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Datum::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Attempts to extract a UTF-8 string reference.
    ///
    /// Returns None for non-string values and for invalid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Real(v)
    }
}

impl From<BigDecimal> for Datum {
    fn from(v: BigDecimal) -> Self {
        Datum::Decimal(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Bytes(v.as_bytes().to_vec())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::Bytes(v.into_bytes())
    }
}

impl From<&[u8]> for Datum {
    fn from(v: &[u8]) -> Self {
        Datum::Bytes(v.to_vec())
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(v: Option<T>) -> Self {
        v.map_or(Datum::Null, Into::into)
    }
}
