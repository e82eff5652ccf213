//! Row batch made of column buffers.

use std::sync::Arc;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use super::column::Column;
use crate::error::{Result, VexprError};
use crate::types::Datum;

/// Default batch size for vectorized evaluation (rows per chunk).
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// A horizontal slice of a result set: ordered columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Chunk {
    /// Creates a chunk from columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the columns have different lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != num_rows) {
            return Err(VexprError::Internal(format!(
                "chunk columns disagree on row count: {} vs {}",
                num_rows,
                bad.len()
            )));
        }
        Ok(Chunk { columns, num_rows })
    }

    /// Creates a chunk with no columns and `num_rows` rows.
    ///
    /// Useful for evaluating constant-only expressions.
    #[must_use]
    pub fn empty(num_rows: usize) -> Self {
        Chunk {
            columns: Vec::new(),
            num_rows,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns a column by index.
    ///
    /// # Errors
    ///
    /// Returns `ColumnOutOfRange` for a bad index.
    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or(VexprError::ColumnOutOfRange {
                index,
                num_columns: self.columns.len(),
            })
    }

    /// Returns all columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consumes the chunk and returns its columns.
    #[must_use]
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Returns row `i` as datums, one per column.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<Datum> {
        self.columns.iter().map(|c| c.datum(i)).collect()
    }

    /// Copies `len` rows starting at `offset` into a new chunk.
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> Chunk {
        let start = offset.min(self.num_rows);
        let end = offset.saturating_add(len).min(self.num_rows);
        Chunk {
            columns: self.columns.iter().map(|c| c.slice(start, end - start)).collect(),
            num_rows: end - start,
        }
    }

    /// Splits the chunk into consecutive chunks of at most `batch_size` rows.
    #[must_use]
    pub fn split(&self, batch_size: usize) -> Vec<Chunk> {
        let batch_size = batch_size.max(1);
        (0..self.num_rows)
            .step_by(batch_size)
            .map(|offset| self.slice(offset, batch_size))
            .collect()
    }

    /// Builds a chunk from an Arrow record batch.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported Arrow column types.
    pub fn try_from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let columns = batch
            .columns()
            .iter()
            .map(|array| Column::from_arrow(array.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Chunk {
            columns,
            num_rows: batch.num_rows(),
        })
    }

    /// Exports the chunk as an Arrow record batch with columns named
    /// `col0`, `col1`, ...
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be exported.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let arrays = self
            .columns
            .iter()
            .map(Column::to_arrow)
            .collect::<Result<Vec<_>>>()?;
        let fields: Vec<Field> = arrays
            .iter()
            .enumerate()
            .map(|(i, a)| Field::new(format!("col{i}"), a.data_type().clone(), true))
            .collect();
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}
