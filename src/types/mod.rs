//! Evaluation types, field types and collations.

mod collation;
mod value;

pub use collation::Collation;
pub use value::Datum;

use serde::{Deserialize, Serialize};

/// Maximum declared width of a string result (16 MiB, the blob limit).
pub const MAX_BLOB_WIDTH: usize = 16_777_216;

/// Maximum number of bytes a single utf8mb4 character occupies.
pub const MAX_BYTES_PER_CHARACTER: usize = 4;

/// Evaluation type of a column or expression.
///
/// Selects the physical shape of a [`crate::chunk::Column`] and which typed
/// accessor is valid on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalType {
    /// 64-bit signed integer lanes.
    Int,
    /// 64-bit floating point lanes.
    Real,
    /// Arbitrary-precision decimal values.
    Decimal,
    /// Variable-width byte strings.
    String,
}

impl EvalType {
    /// Returns the name of the evaluation type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EvalType::Int => "INT",
            EvalType::Real => "REAL",
            EvalType::Decimal => "DECIMAL",
            EvalType::String => "STRING",
        }
    }

    /// Returns whether values of this type are stored in fixed 8-byte lanes.
    #[must_use]
    pub fn is_fixed_width(&self) -> bool {
        matches!(self, EvalType::Int | EvalType::Real)
    }

    /// Returns whether this type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, EvalType::String)
    }

    /// Converts to the Arrow data type used at the chunk boundary.
    #[must_use]
    pub fn to_arrow(&self) -> arrow::datatypes::DataType {
        match self {
            EvalType::Int => arrow::datatypes::DataType::Int64,
            EvalType::Real => arrow::datatypes::DataType::Float64,
            EvalType::Decimal => arrow::datatypes::DataType::Decimal128(38, 10),
            EvalType::String => arrow::datatypes::DataType::Utf8,
        }
    }

    /// Converts from an Arrow data type.
    ///
    /// Returns None for unsupported Arrow types.
    #[must_use]
    pub fn from_arrow(arrow_type: &arrow::datatypes::DataType) -> Option<Self> {
        use arrow::datatypes::DataType as ArrowDataType;
        match arrow_type {
            ArrowDataType::Int8
            | ArrowDataType::Int16
            | ArrowDataType::Int32
            | ArrowDataType::Int64 => Some(EvalType::Int),
            ArrowDataType::Float32 | ArrowDataType::Float64 => Some(EvalType::Real),
            ArrowDataType::Decimal128(_, _) => Some(EvalType::Decimal),
            ArrowDataType::Utf8
            | ArrowDataType::LargeUtf8
            | ArrowDataType::Binary
            | ArrowDataType::LargeBinary => Some(EvalType::String),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static type information of an operand or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    /// Evaluation type.
    pub eval_type: EvalType,
    /// Declared maximum length in bytes.
    pub flen: usize,
    /// Collation of string values. Ignored for numeric types.
    pub collation: Collation,
}

impl FieldType {
    /// Creates a field type with the widest declared length.
    #[must_use]
    pub fn new(eval_type: EvalType) -> Self {
        FieldType {
            eval_type,
            flen: MAX_BLOB_WIDTH,
            collation: Collation::default(),
        }
    }

    /// Integer field type.
    #[must_use]
    pub fn int() -> Self {
        FieldType {
            flen: 20,
            collation: Collation::Binary,
            ..FieldType::new(EvalType::Int)
        }
    }

    /// Floating point field type.
    #[must_use]
    pub fn real() -> Self {
        FieldType {
            flen: 22,
            collation: Collation::Binary,
            ..FieldType::new(EvalType::Real)
        }
    }

    /// Decimal field type.
    #[must_use]
    pub fn decimal() -> Self {
        FieldType {
            flen: 65,
            collation: Collation::Binary,
            ..FieldType::new(EvalType::Decimal)
        }
    }

    /// UTF-8 string field type with the default collation.
    #[must_use]
    pub fn string() -> Self {
        FieldType::new(EvalType::String)
    }

    /// Binary string field type.
    #[must_use]
    pub fn binary() -> Self {
        FieldType::string().with_collation(Collation::Binary)
    }

    /// Sets the declared maximum length.
    #[must_use]
    pub fn with_flen(mut self, flen: usize) -> Self {
        self.flen = flen;
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Returns whether this is a binary string type.
    #[must_use]
    pub fn is_binary_string(&self) -> bool {
        self.eval_type == EvalType::String && self.collation == Collation::Binary
    }
}
