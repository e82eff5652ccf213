//! Projection of a list of expressions over one chunk.

use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::Expression;

/// How an expression was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPath {
    /// One `vec_eval` call over the whole chunk.
    Vectorized,
    /// One evaluation per row over 1-row slices.
    RowFallback,
}

/// Evaluates expressions over a chunk into a new chunk, one output column
/// per expression.
#[derive(Debug, Clone)]
pub struct Projection {
    exprs: Vec<Expression>,
}

impl Projection {
    /// Creates a projection of `exprs`.
    #[must_use]
    pub fn new(exprs: Vec<Expression>) -> Self {
        Projection { exprs }
    }

    /// Returns the projected expressions.
    #[must_use]
    pub fn exprs(&self) -> &[Expression] {
        &self.exprs
    }

    /// Returns the path `expr` takes under `ctx`.
    ///
    /// Vectorized evaluation is used only when the session enables it and
    /// every node of the expression supports it.
    #[must_use]
    pub fn path_for(ctx: &EvalContext, expr: &Expression) -> EvalPath {
        if ctx.config().enable_vectorized && expr.is_vectorized() {
            EvalPath::Vectorized
        } else {
            EvalPath::RowFallback
        }
    }

    /// Evaluates every expression over `input`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal evaluation error, or a packet overflow in
    /// strict mode. Recoverable conditions are recorded in `ctx` instead.
    pub fn execute(&self, ctx: &EvalContext, input: &Chunk) -> Result<Chunk> {
        let rows = input.num_rows();
        let _span = tracing::debug_span!(
            "projection",
            rows,
            exprs = self.exprs.len(),
            vectorized = ctx.config().enable_vectorized,
        )
        .entered();

        let mut columns = Vec::with_capacity(self.exprs.len());
        for expr in &self.exprs {
            let column = match Self::path_for(ctx, expr) {
                EvalPath::Vectorized => {
                    let mut out = ctx.lease(expr.eval_type());
                    expr.vec_eval(ctx, input, &mut out)?;
                    out.detach()
                }
                EvalPath::RowFallback => eval_rows(ctx, expr, input)?,
            };
            columns.push(column);
        }

        tracing::debug!(
            rows,
            warnings = ctx.diagnostics().len(),
            "projection complete"
        );
        if columns.is_empty() {
            return Ok(Chunk::empty(rows));
        }
        Chunk::new(columns)
    }
}

/// Row-at-a-time evaluation of `expr`.
fn eval_rows(ctx: &EvalContext, expr: &Expression, input: &Chunk) -> Result<Column> {
    let rows = input.num_rows();
    let mut out = Column::with_capacity(expr.eval_type(), rows);
    for row in 0..rows {
        let datum = expr.eval_row(ctx, input, row)?;
        out.append_datum(&datum)?;
    }
    ctx.stats().record_row_fallback(rows);
    Ok(out)
}
