//! vexpr - vectorized SQL scalar string functions
//!
//! Evaluates built-in string functions over columnar chunks a batch at a
//! time: operands are evaluated into pooled column buffers, null bitmaps are
//! merged, and each function applies its own row policy with oversized
//! results checked against a packet budget.
//!
//! ```
//! use vexpr::{BuiltinFunction, Chunk, Column, EvalContext, Expression, FieldType, Projection};
//! use vexpr::types::EvalType;
//!
//! let names = Column::from_datums(EvalType::String, &["ab".into(), "xyz".into()])?;
//! let input = Chunk::new(vec![names])?;
//!
//! let repeat = Expression::call(
//!     BuiltinFunction::Repeat,
//!     vec![Expression::column(0, FieldType::string()), Expression::int(2)],
//! )?;
//! let ctx = EvalContext::default();
//! let output = Projection::new(vec![repeat]).execute(&ctx, &input)?;
//! assert_eq!(output.column(0)?.get_bytes(1), b"xyzxyz");
//! # Ok::<(), vexpr::VexprError>(())
//! ```

pub mod chunk;
pub mod context;
pub mod error;
pub mod executor;
pub mod expression;
pub mod format;
pub mod types;

pub use chunk::{Chunk, Column, ColumnLease, ColumnPool, NullBitmap, DEFAULT_BATCH_SIZE};
pub use context::{EvalConfig, EvalContext, EvalWarning};
pub use error::{Result, VexprError};
pub use executor::{ParallelOutput, ParallelProjection, Projection};
pub use expression::{BuiltinFunction, Expression, ScalarFunction, VectorizedFunction};
pub use format::Locale;
pub use types::{Collation, Datum, FieldType};
