//! Scalar function calls and the vectorized evaluation contract.

use super::builtin::BuiltinFunction;
use super::Expression;
use crate::chunk::{Chunk, Column, ColumnLease};
use crate::context::EvalContext;
use crate::error::{Result, VexprError};
use crate::types::{Collation, EvalType, FieldType};

/// Capability implemented by everything that evaluates a whole chunk at once.
pub trait VectorizedFunction {
    /// Returns whether [`VectorizedFunction::eval_batch`] is supported.
    ///
    /// Callers fall back to row-at-a-time evaluation otherwise.
    fn is_vectorized(&self) -> bool;

    /// Evaluates over every row of `input`, replacing the contents of `out`.
    ///
    /// On success `out` holds exactly `input.num_rows()` rows.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions: operand evaluation
    /// failure, an internal invariant violation, or packet overflow in strict
    /// mode. Data-dependent outcomes become NULLs, fallbacks or warnings.
    fn eval_batch(&self, ctx: &EvalContext, input: &Chunk, out: &mut Column) -> Result<()>;
}

/// A call of a built-in function on argument expressions.
#[derive(Debug, Clone)]
pub struct ScalarFunction {
    kind: BuiltinFunction,
    args: Vec<Expression>,
    field_type: FieldType,
    collation: Collation,
}

impl ScalarFunction {
    /// Builds a call, checking argument count and operand types.
    ///
    /// The comparison collation is derived from the string operands: binary
    /// if any is binary, otherwise the first string operand's collation.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentCount` or `TypeMismatch` for a bad call.
    pub fn new(kind: BuiltinFunction, args: Vec<Expression>) -> Result<Self> {
        let sig = kind.signature();
        if !sig.accepts_count(args.len()) {
            return Err(VexprError::ArgumentCount {
                function: kind.name(),
                expected: sig.describe_count(),
                actual: args.len(),
            });
        }
        for (i, arg) in args.iter().enumerate() {
            let actual = arg.eval_type();
            match sig.arg_type(i) {
                Some(expected) if expected.accepts(actual) => {}
                Some(expected) => {
                    return Err(VexprError::TypeMismatch {
                        expected: expected.expected(),
                        actual,
                    })
                }
                None => {
                    return Err(VexprError::Internal(format!(
                        "no argument slot {i} for {}",
                        kind.name()
                    )))
                }
            }
        }

        let collation = derive_collation(&args);
        let field_type = match (kind, kind.return_type()) {
            (_, EvalType::Int) => FieldType::int(),
            (BuiltinFunction::Char, _) => FieldType::binary(),
            (_, eval_type) => FieldType::new(eval_type).with_collation(collation),
        };

        Ok(ScalarFunction {
            kind,
            args,
            field_type,
            collation,
        })
    }

    /// Overrides the result field type.
    ///
    /// The evaluation type stays the function's own; only the declared length
    /// and collation are taken from `field_type`.
    #[must_use]
    pub fn with_field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = FieldType {
            eval_type: self.kind.return_type(),
            ..field_type
        };
        self
    }

    /// Overrides the comparison collation.
    #[must_use]
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Returns the function kind.
    #[must_use]
    pub fn kind(&self) -> BuiltinFunction {
        self.kind
    }

    /// Returns the argument expressions.
    #[must_use]
    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    /// Returns the result field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the comparison collation.
    #[must_use]
    pub fn collation(&self) -> Collation {
        self.collation
    }

    /// Declared maximum width of the result, bounded by the session's blob
    /// limit.
    pub(crate) fn result_flen(&self, ctx: &EvalContext) -> usize {
        self.field_type.flen.min(ctx.config().max_blob_width)
    }

    /// Evaluates argument `i` into a leased column.
    pub(crate) fn eval_arg<'c>(
        &self,
        ctx: &'c EvalContext,
        i: usize,
        input: &Chunk,
    ) -> Result<ColumnLease<'c>> {
        let arg = self.args.get(i).ok_or_else(|| {
            VexprError::Internal(format!("{} has no argument {i}", self.kind.name()))
        })?;
        let mut col = ctx.lease(arg.eval_type());
        arg.vec_eval(ctx, input, &mut col)?;
        Ok(col)
    }

    /// Evaluates arguments `from..` into leased columns.
    pub(crate) fn eval_args_from<'c>(
        &self,
        ctx: &'c EvalContext,
        from: usize,
        input: &Chunk,
    ) -> Result<Vec<ColumnLease<'c>>> {
        (from..self.args.len())
            .map(|i| self.eval_arg(ctx, i, input))
            .collect()
    }
}

impl VectorizedFunction for ScalarFunction {
    fn is_vectorized(&self) -> bool {
        self.kind.is_vectorized() && self.args.iter().all(Expression::is_vectorized)
    }

    fn eval_batch(&self, ctx: &EvalContext, input: &Chunk, out: &mut Column) -> Result<()> {
        out.reset(self.kind.return_type());
        out.reserve(input.num_rows());
        self.kind.eval(self, ctx, input, out)?;
        if out.len() != input.num_rows() {
            return Err(VexprError::Internal(format!(
                "{} produced {} rows for a chunk of {}",
                self.kind.name(),
                out.len(),
                input.num_rows()
            )));
        }
        Ok(())
    }
}

fn derive_collation(args: &[Expression]) -> Collation {
    let mut strings = args
        .iter()
        .map(Expression::field_type)
        .filter(|ft| ft.eval_type == EvalType::String);
    let first = strings.next().map(|ft| ft.collation);
    if first == Some(Collation::Binary) || strings.any(|ft| ft.collation == Collation::Binary) {
        Collation::Binary
    } else {
        first.unwrap_or_default()
    }
}
