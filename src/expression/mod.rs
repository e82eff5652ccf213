//! Expression trees and their evaluation over chunks.
//!
//! Leaves are column references and constants; inner nodes are
//! [`ScalarFunction`] calls. Every node evaluates a whole chunk into a
//! [`Column`] with [`Expression::vec_eval`], and a single row with
//! [`Expression::eval_row`].

pub mod builtin;
mod function;
pub mod text;

pub use builtin::{ArgType, BuiltinFunction, Signature};
pub use function::{ScalarFunction, VectorizedFunction};

use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::{Result, VexprError};
use crate::types::{Datum, EvalType, FieldType};

/// A scalar expression.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Reference to a column of the input chunk.
    Column { index: usize, field_type: FieldType },
    /// A value broadcast to every row.
    Constant { value: Datum, field_type: FieldType },
    /// A built-in function call.
    Function(Box<ScalarFunction>),
}

impl Expression {
    /// Column reference.
    #[must_use]
    pub fn column(index: usize, field_type: FieldType) -> Self {
        Expression::Column { index, field_type }
    }

    /// Constant of the given field type.
    #[must_use]
    pub fn constant(value: impl Into<Datum>, field_type: FieldType) -> Self {
        Expression::Constant {
            value: value.into(),
            field_type,
        }
    }

    /// Integer constant.
    #[must_use]
    pub fn int(v: i64) -> Self {
        Expression::constant(v, FieldType::int())
    }

    /// Floating point constant.
    #[must_use]
    pub fn real(v: f64) -> Self {
        Expression::constant(v, FieldType::real())
    }

    /// UTF-8 string constant.
    #[must_use]
    pub fn string(v: &str) -> Self {
        Expression::constant(v, FieldType::string())
    }

    /// NULL constant of the given field type.
    #[must_use]
    pub fn null(field_type: FieldType) -> Self {
        Expression::Constant {
            value: Datum::Null,
            field_type,
        }
    }

    /// Builds a function call.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not fit the function signature.
    pub fn call(kind: BuiltinFunction, args: Vec<Expression>) -> Result<Self> {
        Ok(Expression::Function(Box::new(ScalarFunction::new(kind, args)?)))
    }

    /// Returns the static type of the expression.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Expression::Column { field_type, .. } | Expression::Constant { field_type, .. } => {
                *field_type
            }
            Expression::Function(f) => f.field_type(),
        }
    }

    /// Returns the evaluation type of the expression.
    #[must_use]
    pub fn eval_type(&self) -> EvalType {
        self.field_type().eval_type
    }

    /// Returns the value if this is a constant.
    #[must_use]
    pub fn constant_value(&self) -> Option<&Datum> {
        match self {
            Expression::Constant { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns whether the whole tree supports batch evaluation.
    #[must_use]
    pub fn is_vectorized(&self) -> bool {
        match self {
            Expression::Column { .. } | Expression::Constant { .. } => true,
            Expression::Function(f) => f.is_vectorized(),
        }
    }

    /// Evaluates over every row of `input`, replacing the contents of `out`.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad column reference, a constant whose value
    /// does not match its declared type, or a fatal function error.
    pub fn vec_eval(&self, ctx: &EvalContext, input: &Chunk, out: &mut Column) -> Result<()> {
        let n = input.num_rows();
        match self {
            Expression::Column { index, field_type } => {
                let src = input.column(*index)?;
                if src.eval_type() != field_type.eval_type {
                    return Err(VexprError::TypeMismatch {
                        expected: field_type.eval_type,
                        actual: src.eval_type(),
                    });
                }
                out.reset(field_type.eval_type);
                out.reserve(n);
                for i in 0..n {
                    out.append_from(src, i)?;
                }
                Ok(())
            }
            Expression::Constant { value, field_type } => {
                out.reset(field_type.eval_type);
                out.reserve(n);
                for _ in 0..n {
                    out.append_datum(value)?;
                }
                Ok(())
            }
            Expression::Function(f) => f.eval_batch(ctx, input, out),
        }
    }

    /// Evaluates row `row` of `input` on its own.
    ///
    /// Runs the same evaluator as [`Expression::vec_eval`] over a one-row
    /// slice of the chunk.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Expression::vec_eval`].
    pub fn eval_row(&self, ctx: &EvalContext, input: &Chunk, row: usize) -> Result<Datum> {
        if row >= input.num_rows() {
            return Err(VexprError::Internal(format!(
                "row {row} out of range for chunk of {}",
                input.num_rows()
            )));
        }
        let single = input.slice(row, 1);
        let mut col = ctx.lease(self.eval_type());
        self.vec_eval(ctx, &single, &mut col)?;
        Ok(col.datum(0))
    }
}

impl From<ScalarFunction> for Expression {
    fn from(f: ScalarFunction) -> Self {
        Expression::Function(Box::new(f))
    }
}
