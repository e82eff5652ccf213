//! Integer-valued string functions: ISNULL, LENGTH, BIT_LENGTH,
//! CHAR_LENGTH, ASCII, ORD and STRCMP.

use std::cmp::Ordering;

use super::map_string_to_int;
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::{char_len, decode_rune};
use crate::expression::ScalarFunction;
use crate::types::Collation;

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// ISNULL(str). Never NULL itself.
pub(super) fn eval_is_null(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let arg = func.eval_arg(ctx, 0, input)?;
    out.reserve(input.num_rows());
    for i in 0..input.num_rows() {
        out.append_i64(i64::from(arg.is_null(i)));
    }
    Ok(())
}

/// LENGTH(str), and CHAR_LENGTH of a binary string: the byte count.
pub(super) fn eval_length(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string_to_int(func, ctx, input, out, |s| to_i64(s.len()))
}

pub(super) fn eval_bit_length(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string_to_int(func, ctx, input, out, |s| to_i64(s.len()).saturating_mul(8))
}

/// CHAR_LENGTH(str) in code points; each invalid byte counts as one.
pub(super) fn eval_char_length_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string_to_int(func, ctx, input, out, |s| to_i64(char_len(s)))
}

/// ASCII(str): the first byte, 0 for an empty string.
pub(super) fn eval_ascii(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string_to_int(func, ctx, input, out, |s| s.first().map_or(0, |&b| i64::from(b)))
}

/// ORD(str): the bytes of the first character read as a big-endian number.
pub(super) fn eval_ord(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let binary = func.collation() == Collation::Binary;
    map_string_to_int(func, ctx, input, out, |s| ord(s, binary))
}

fn ord(s: &[u8], binary: bool) -> i64 {
    if s.is_empty() {
        return 0;
    }
    let width = if binary { 1 } else { decode_rune(s).1 };
    s[..width]
        .iter()
        .fold(0i64, |acc, &b| (acc << 8) | i64::from(b))
}

/// STRCMP(a, b) under the function collation: -1, 0 or 1.
pub(super) fn eval_strcmp(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let left = func.eval_arg(ctx, 0, input)?;
    let right = func.eval_arg(ctx, 1, input)?;
    let collation = func.collation();
    out.reserve(input.num_rows());
    for i in 0..input.num_rows() {
        let cmp = match collation.compare(left.get_bytes(i), right.get_bytes(i)) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        };
        out.append_i64(cmp);
    }
    out.merge_nulls(&[&*left, &*right]);
    Ok(())
}
