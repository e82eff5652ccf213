//! LTRIM, RTRIM and TRIM.

use super::map_string;
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::ScalarFunction;

/// Direction code for leading-only removal.
pub const TRIM_LEADING: i64 = 2;
/// Direction code for trailing-only removal.
pub const TRIM_TRAILING: i64 = 3;

fn trim_left<'a>(mut s: &'a [u8], rem: &[u8]) -> &'a [u8] {
    if rem.is_empty() {
        return s;
    }
    while s.starts_with(rem) {
        s = &s[rem.len()..];
    }
    s
}

fn trim_right<'a>(mut s: &'a [u8], rem: &[u8]) -> &'a [u8] {
    if rem.is_empty() {
        return s;
    }
    while s.ends_with(rem) {
        s = &s[..s.len() - rem.len()];
    }
    s
}

pub(super) fn eval_ltrim(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string(func, ctx, input, out, |s, buf| {
        buf.extend_from_slice(trim_left(s, b" "));
    })
}

pub(super) fn eval_rtrim(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string(func, ctx, input, out, |s, buf| {
        buf.extend_from_slice(trim_right(s, b" "));
    })
}

/// TRIM(str), TRIM(str, remstr) and TRIM(str, remstr, direction).
///
/// Without `remstr` only spaces are removed. A direction of
/// [`TRIM_LEADING`] or [`TRIM_TRAILING`] restricts the side; any other
/// value trims both.
pub(super) fn eval_trim(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    if func.args().len() == 1 {
        return map_string(func, ctx, input, out, |s, buf| {
            buf.extend_from_slice(trim_right(trim_left(s, b" "), b" "));
        });
    }

    let strs = func.eval_arg(ctx, 0, input)?;
    let rems = func.eval_arg(ctx, 1, input)?;
    let directions = if func.args().len() > 2 {
        Some(func.eval_arg(ctx, 2, input)?)
    } else {
        None
    };
    let mut operands: Vec<&Column> = vec![&*strs, &*rems];
    operands.extend(directions.as_deref());
    let nulls = Column::union_nulls(&operands);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let (s, rem) = (strs.get_bytes(i), rems.get_bytes(i));
        let trimmed = match directions.as_ref().map(|c| c.get_i64(i)) {
            Some(TRIM_LEADING) => trim_left(s, rem),
            Some(TRIM_TRAILING) => trim_right(s, rem),
            _ => trim_right(trim_left(s, rem), rem),
        };
        out.append_bytes(trimmed);
    }
    Ok(())
}
