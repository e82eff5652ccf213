//! Shared builders for contract tests.

#![allow(dead_code)]

use vexpr::types::EvalType;
use vexpr::{
    BuiltinFunction, Chunk, Column, Datum, EvalConfig, EvalContext, EvalWarning, Expression,
    FieldType, Projection, Result,
};

/// Builds a string column from optional values.
pub fn str_col(values: &[Option<&str>]) -> Column {
    let datums: Vec<Datum> = values
        .iter()
        .map(|v| v.map_or(Datum::Null, Datum::from))
        .collect();
    Column::from_datums(EvalType::String, &datums).unwrap()
}

/// Builds an integer column from optional values.
pub fn int_col(values: &[Option<i64>]) -> Column {
    let datums: Vec<Datum> = values
        .iter()
        .map(|v| v.map_or(Datum::Null, Datum::Int))
        .collect();
    Column::from_datums(EvalType::Int, &datums).unwrap()
}

/// Shorthand for a string datum.
pub fn s(v: &str) -> Datum {
    Datum::from(v)
}

/// Builds a call, panicking on a signature error.
pub fn call(kind: BuiltinFunction, args: Vec<Expression>) -> Expression {
    Expression::call(kind, args).unwrap()
}

/// Column reference of the given type.
pub fn col(index: usize, eval_type: EvalType) -> Expression {
    Expression::column(index, FieldType::new(eval_type))
}

/// Evaluates `expr` over `input` under `ctx`, returning one datum per row.
pub fn eval_with(ctx: &EvalContext, expr: &Expression, input: &Chunk) -> Result<Vec<Datum>> {
    let output = Projection::new(vec![expr.clone()]).execute(ctx, input)?;
    Ok(output.column(0)?.to_datums())
}

/// Evaluates `expr` over `input` with a default context.
pub fn eval(expr: &Expression, input: &Chunk) -> (Vec<Datum>, Vec<EvalWarning>) {
    let ctx = EvalContext::default();
    let values = eval_with(&ctx, expr, input).unwrap();
    (values, ctx.warnings())
}

/// Evaluates a call whose arguments are all constants, over one row.
pub fn eval_const(kind: BuiltinFunction, args: Vec<Expression>) -> Datum {
    let (values, _) = eval(&call(kind, args), &Chunk::empty(1));
    values.into_iter().next().unwrap()
}

/// Context with the given config, panicking on an invalid one.
pub fn context(config: EvalConfig) -> EvalContext {
    EvalContext::new(config).unwrap()
}
