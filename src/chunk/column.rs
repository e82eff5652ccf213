//! Typed columnar buffer for one attribute of a batch.
//!
//! A column has one of two physical shapes:
//! - fixed-width: one 8-byte lane per row (`Int`, `Real`), with decimals kept
//!   as one arbitrary-precision value per row;
//! - variable-width: a byte arena plus an offset table (`String`), where row
//!   `i` spans `data[offsets[i]..offsets[i + 1]]` and `offsets[0] == 0`.
//!
//! Columns are append-only while being populated. [`Column::reset`] truncates
//! to zero rows and retypes the buffer without releasing its storage, which is
//! what lets [`super::ColumnPool`] hand the same allocation out batch after
//! batch.

use std::borrow::Cow;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BinaryArray, Decimal128Array, Float64Array, Int64Array,
    StringArray,
};
use arrow::datatypes::{
    DataType as ArrowDataType, Decimal128Type, Float64Type, Int64Type,
    DECIMAL128_MAX_PRECISION, DECIMAL128_MAX_SCALE,
};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::nulls::NullBitmap;
use crate::error::{Result, VexprError};
use crate::types::{Datum, EvalType};

/// Typed, append-only column buffer with a null bitmap.
#[derive(Debug, Clone)]
pub struct Column {
    eval_type: EvalType,
    len: usize,
    nulls: NullBitmap,
    /// Fixed-width lanes (`Int` as two's complement, `Real` as IEEE bits).
    lanes: Vec<u64>,
    /// Row boundaries into `data`; `len + 1` entries for string columns.
    offsets: Vec<usize>,
    /// Byte arena for string columns.
    data: Vec<u8>,
    /// Decimal values.
    decimals: Vec<BigDecimal>,
}

impl Column {
    /// Creates a new empty column.
    #[must_use]
    pub fn new(eval_type: EvalType) -> Self {
        Self::with_capacity(eval_type, 0)
    }

    /// Creates a new empty column with room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(eval_type: EvalType, capacity: usize) -> Self {
        let mut column = Column {
            eval_type,
            len: 0,
            nulls: NullBitmap::with_capacity(capacity),
            lanes: Vec::new(),
            offsets: vec![0],
            data: Vec::new(),
            decimals: Vec::new(),
        };
        column.reserve(capacity);
        column
    }

    /// Builds a column from datums. Null datums become null rows.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if a non-null datum does not match `eval_type`.
    pub fn from_datums(eval_type: EvalType, datums: &[Datum]) -> Result<Self> {
        let mut column = Column::with_capacity(eval_type, datums.len());
        for datum in datums {
            column.append_datum(datum)?;
        }
        Ok(column)
    }

    /// Truncates to zero rows and retypes the buffer, keeping capacity.
    pub fn reset(&mut self, eval_type: EvalType) {
        self.eval_type = eval_type;
        self.len = 0;
        self.nulls.clear();
        self.lanes.clear();
        self.offsets.clear();
        self.offsets.push(0);
        self.data.clear();
        self.decimals.clear();
    }

    /// Reserves room for `additional` more rows of the current type.
    pub fn reserve(&mut self, additional: usize) {
        self.nulls.reserve(additional);
        match self.eval_type {
            EvalType::Int | EvalType::Real => self.lanes.reserve(additional),
            EvalType::Decimal => self.decimals.reserve(additional),
            EvalType::String => self.offsets.reserve(additional),
        }
    }

    /// Reserves room for `additional` more bytes in the string arena.
    pub fn reserve_bytes(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Returns the evaluation type.
    #[must_use]
    pub fn eval_type(&self) -> EvalType {
        self.eval_type
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the null bitmap.
    #[must_use]
    pub fn nulls(&self) -> &NullBitmap {
        &self.nulls
    }

    /// Returns whether row `i` is null.
    #[must_use]
    pub fn is_null(&self, i: usize) -> bool {
        self.nulls.is_null(i)
    }

    /// Returns the number of null rows.
    #[must_use]
    pub fn null_count(&self) -> usize {
        self.nulls.count_nulls()
    }

    /// Returns the allocated row capacity of the active storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self.eval_type {
            EvalType::Int | EvalType::Real => self.lanes.capacity(),
            EvalType::Decimal => self.decimals.capacity(),
            EvalType::String => self.offsets.capacity().saturating_sub(1),
        }
    }

    /// Returns the allocated size of the string arena.
    #[must_use]
    pub fn byte_capacity(&self) -> usize {
        self.data.capacity()
    }

    // ==================== Appends ====================

    /// Appends a null row.
    pub fn append_null(&mut self) {
        match self.eval_type {
            EvalType::Int | EvalType::Real => self.lanes.push(0),
            EvalType::Decimal => self.decimals.push(BigDecimal::default()),
            EvalType::String => self.offsets.push(self.data.len()),
        }
        self.nulls.push(true);
        self.len += 1;
    }

    /// Appends an integer row.
    pub fn append_i64(&mut self, v: i64) {
        debug_assert_eq!(self.eval_type, EvalType::Int);
        self.lanes.push(v as u64);
        self.push_valid();
    }

    /// Appends a floating point row.
    pub fn append_f64(&mut self, v: f64) {
        debug_assert_eq!(self.eval_type, EvalType::Real);
        self.lanes.push(v.to_bits());
        self.push_valid();
    }

    /// Appends a decimal row.
    pub fn append_decimal(&mut self, v: BigDecimal) {
        debug_assert_eq!(self.eval_type, EvalType::Decimal);
        self.decimals.push(v);
        self.push_valid();
    }

    /// Appends a byte-string row.
    pub fn append_bytes(&mut self, v: &[u8]) {
        debug_assert_eq!(self.eval_type, EvalType::String);
        self.data.extend_from_slice(v);
        self.offsets.push(self.data.len());
        self.push_valid();
    }

    /// Appends a string row.
    pub fn append_str(&mut self, v: &str) {
        self.append_bytes(v.as_bytes());
    }

    /// Appends a string row assembled from several parts, without an
    /// intermediate allocation.
    pub fn append_concat<'a>(&mut self, parts: impl IntoIterator<Item = &'a [u8]>) {
        debug_assert_eq!(self.eval_type, EvalType::String);
        for part in parts {
            self.data.extend_from_slice(part);
        }
        self.offsets.push(self.data.len());
        self.push_valid();
    }

    /// Appends a datum.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the datum does not match the column type.
    pub fn append_datum(&mut self, datum: &Datum) -> Result<()> {
        match (self.eval_type, datum) {
            (_, Datum::Null) => self.append_null(),
            (EvalType::Int, Datum::Int(v)) => self.append_i64(*v),
            (EvalType::Real, Datum::Real(v)) => self.append_f64(*v),
            (EvalType::Decimal, Datum::Decimal(v)) => self.append_decimal(v.clone()),
            (EvalType::String, Datum::Bytes(v)) => self.append_bytes(v),
            (expected, other) => {
                return Err(VexprError::TypeMismatch {
                    expected,
                    actual: other.eval_type().unwrap_or(expected),
                })
            }
        }
        Ok(())
    }

    /// Appends row `i` of `other`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `other` has a different type.
    pub fn append_from(&mut self, other: &Column, i: usize) -> Result<()> {
        if other.eval_type != self.eval_type {
            return Err(VexprError::TypeMismatch {
                expected: self.eval_type,
                actual: other.eval_type,
            });
        }
        self.push_row(other, i);
        Ok(())
    }

    /// Copies row `i` of a column of the same type.
    fn push_row(&mut self, other: &Column, i: usize) {
        debug_assert_eq!(self.eval_type, other.eval_type);
        if other.is_null(i) {
            self.append_null();
            return;
        }
        match other.eval_type {
            EvalType::Int | EvalType::Real => {
                self.lanes.push(other.lanes[i]);
                self.push_valid();
            }
            EvalType::Decimal => self.append_decimal(other.decimals[i].clone()),
            EvalType::String => self.append_bytes(other.get_bytes(i)),
        }
    }

    fn push_valid(&mut self) {
        self.nulls.push(false);
        self.len += 1;
    }

    // ==================== Accessors ====================

    /// Returns row `i` as an integer. Meaningless (but safe) at null rows.
    #[must_use]
    pub fn get_i64(&self, i: usize) -> i64 {
        debug_assert_eq!(self.eval_type, EvalType::Int);
        self.lanes[i] as i64
    }

    /// Returns row `i` as a float. Meaningless (but safe) at null rows.
    #[must_use]
    pub fn get_f64(&self, i: usize) -> f64 {
        debug_assert_eq!(self.eval_type, EvalType::Real);
        f64::from_bits(self.lanes[i])
    }

    /// Returns row `i` as a decimal. Zero at null rows.
    #[must_use]
    pub fn get_decimal(&self, i: usize) -> &BigDecimal {
        debug_assert_eq!(self.eval_type, EvalType::Decimal);
        &self.decimals[i]
    }

    /// Returns row `i` as raw bytes. Empty at null rows.
    #[must_use]
    pub fn get_bytes(&self, i: usize) -> &[u8] {
        debug_assert_eq!(self.eval_type, EvalType::String);
        &self.data[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Returns row `i` as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn get_str_lossy(&self, i: usize) -> Cow<'_, str> {
        String::from_utf8_lossy(self.get_bytes(i))
    }

    /// Returns row `i` as a datum.
    #[must_use]
    pub fn datum(&self, i: usize) -> Datum {
        if self.is_null(i) {
            return Datum::Null;
        }
        match self.eval_type {
            EvalType::Int => Datum::Int(self.get_i64(i)),
            EvalType::Real => Datum::Real(self.get_f64(i)),
            EvalType::Decimal => Datum::Decimal(self.get_decimal(i).clone()),
            EvalType::String => Datum::Bytes(self.get_bytes(i).to_vec()),
        }
    }

    /// Returns every row as a datum.
    #[must_use]
    pub fn to_datums(&self) -> Vec<Datum> {
        (0..self.len).map(|i| self.datum(i)).collect()
    }

    /// Copies `len` rows starting at `offset` into a new column.
    ///
    /// The range is clamped to the column bounds.
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> Column {
        let start = offset.min(self.len);
        let end = offset.saturating_add(len).min(self.len);
        let mut out = Column::with_capacity(self.eval_type, end - start);
        for i in start..end {
            out.push_row(self, i);
        }
        out
    }

    // ==================== Null propagation ====================

    /// Marks row `i` null wherever any of `others` has row `i` null.
    ///
    /// Values stored at newly-null rows are left in place; they are never
    /// read as meaningful data.
    pub fn merge_nulls(&mut self, others: &[&Column]) {
        for other in others {
            self.nulls.union_with(&other.nulls);
        }
    }

    /// Returns the union of the null bitmaps of `columns`.
    ///
    /// Used by variable-width outputs, which cannot be merged after the fact
    /// because their rows are appended one by one.
    #[must_use]
    pub fn union_nulls(columns: &[&Column]) -> NullBitmap {
        let mut nulls = columns
            .first()
            .map(|c| c.nulls.clone())
            .unwrap_or_default();
        for other in columns.iter().skip(1) {
            nulls.union_with(&other.nulls);
        }
        nulls
    }

    // ==================== Arrow interop ====================

    /// Exports the column as an Arrow array.
    ///
    /// String columns holding invalid UTF-8 export as `Binary`.
    ///
    /// # Errors
    ///
    /// Returns an error if a decimal does not fit `Decimal128(38, s)`.
    pub fn to_arrow(&self) -> Result<ArrayRef> {
        let array: ArrayRef = match self.eval_type {
            EvalType::Int => Arc::new(Int64Array::from(
                (0..self.len)
                    .map(|i| (!self.is_null(i)).then(|| self.get_i64(i)))
                    .collect::<Vec<_>>(),
            )),
            EvalType::Real => Arc::new(Float64Array::from(
                (0..self.len)
                    .map(|i| (!self.is_null(i)).then(|| self.get_f64(i)))
                    .collect::<Vec<_>>(),
            )),
            EvalType::Decimal => self.decimals_to_arrow()?,
            EvalType::String => {
                let rows: Vec<Option<&[u8]>> = (0..self.len)
                    .map(|i| (!self.is_null(i)).then(|| self.get_bytes(i)))
                    .collect();
                // Each row on its own: byte slicing can split one character
                // across two rows that are valid only when concatenated.
                let strs: Option<Vec<Option<&str>>> = rows
                    .iter()
                    .map(|r| match r {
                        Some(b) => std::str::from_utf8(b).ok().map(Some),
                        None => Some(None),
                    })
                    .collect();
                match strs {
                    Some(strs) => Arc::new(StringArray::from(strs)),
                    None => Arc::new(BinaryArray::from(rows)),
                }
            }
        };
        Ok(array)
    }

    fn decimals_to_arrow(&self) -> Result<ArrayRef> {
        let scale = (0..self.len)
            .filter(|&i| !self.is_null(i))
            .map(|i| self.decimals[i].as_bigint_and_exponent().1)
            .max()
            .unwrap_or(0)
            .max(0);
        let arrow_scale = i8::try_from(scale)
            .ok()
            .filter(|&s| s <= DECIMAL128_MAX_SCALE)
            .ok_or_else(|| {
                VexprError::Internal(format!(
                    "decimal scale {scale} exceeds Decimal128 maximum of {DECIMAL128_MAX_SCALE}"
                ))
            })?;
        let mut values = Vec::with_capacity(self.len);
        for i in 0..self.len {
            if self.is_null(i) {
                values.push(None);
                continue;
            }
            let (digits, _) = self.decimals[i].with_scale(scale).as_bigint_and_exponent();
            let v = i128::try_from(&digits).map_err(|_| {
                VexprError::Internal(format!(
                    "decimal {} does not fit Decimal128",
                    self.decimals[i]
                ))
            })?;
            values.push(Some(v));
        }
        let array = Decimal128Array::from(values)
            .with_precision_and_scale(DECIMAL128_MAX_PRECISION, arrow_scale)?;
        Ok(Arc::new(array))
    }

    /// Imports an Arrow array.
    ///
    /// # Errors
    ///
    /// Returns an error for Arrow types with no evaluation type.
    pub fn from_arrow(array: &dyn Array) -> Result<Column> {
        let eval_type = EvalType::from_arrow(array.data_type()).ok_or_else(|| {
            VexprError::Internal(format!("unsupported Arrow type {}", array.data_type()))
        })?;
        let mut column = Column::with_capacity(eval_type, array.len());
        match array.data_type() {
            ArrowDataType::Decimal128(_, scale) => {
                let decimals = array.as_primitive::<Decimal128Type>();
                for i in 0..decimals.len() {
                    if decimals.is_null(i) {
                        column.append_null();
                    } else {
                        let digits = BigInt::from(decimals.value(i));
                        column.append_decimal(BigDecimal::new(digits, i64::from(*scale)));
                    }
                }
            }
            ArrowDataType::Binary | ArrowDataType::LargeBinary => {
                let cast = arrow::compute::cast(array, &ArrowDataType::Binary)?;
                let bytes = cast.as_binary::<i32>();
                for i in 0..bytes.len() {
                    if bytes.is_null(i) {
                        column.append_null();
                    } else {
                        column.append_bytes(bytes.value(i));
                    }
                }
            }
            _ => match eval_type {
                EvalType::Int => {
                    let cast = arrow::compute::cast(array, &ArrowDataType::Int64)?;
                    let ints = cast.as_primitive::<Int64Type>();
                    for i in 0..ints.len() {
                        if ints.is_null(i) {
                            column.append_null();
                        } else {
                            column.append_i64(ints.value(i));
                        }
                    }
                }
                EvalType::Real => {
                    let cast = arrow::compute::cast(array, &ArrowDataType::Float64)?;
                    let reals = cast.as_primitive::<Float64Type>();
                    for i in 0..reals.len() {
                        if reals.is_null(i) {
                            column.append_null();
                        } else {
                            column.append_f64(reals.value(i));
                        }
                    }
                }
                EvalType::String => {
                    let cast = arrow::compute::cast(array, &ArrowDataType::Utf8)?;
                    let strs = cast.as_string::<i32>();
                    for i in 0..strs.len() {
                        if strs.is_null(i) {
                            column.append_null();
                        } else {
                            column.append_str(strs.value(i));
                        }
                    }
                }
                EvalType::Decimal => unreachable!("decimal arrays handled above"),
            },
        }
        Ok(column)
    }
}
