//! LOWER, UPPER and REVERSE.

use super::map_string;
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::runes;
use crate::expression::ScalarFunction;

/// Binary strings have no letter case: the operand passes through.
pub(super) fn eval_binary_case(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    match func.args().first() {
        Some(arg) => arg.vec_eval(ctx, input, out),
        None => Ok(()),
    }
}

pub(super) fn eval_lower_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string(func, ctx, input, out, |s, buf| {
        map_chars(s, buf, |c, dst| dst.extend(c.to_lowercase()));
    })
}

pub(super) fn eval_upper_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string(func, ctx, input, out, |s, buf| {
        map_chars(s, buf, |c, dst| dst.extend(c.to_uppercase()));
    })
}

pub(super) fn eval_reverse(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string(func, ctx, input, out, |s, buf| {
        buf.extend(s.iter().rev());
    })
}

/// Reverses by code point; undecodable bytes move as single units.
pub(super) fn eval_reverse_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let mut widths: Vec<usize> = Vec::new();
    map_string(func, ctx, input, out, |s, buf| {
        widths.clear();
        widths.extend(runes(s).map(|(_, unit)| unit.len()));
        let mut end = s.len();
        for width in widths.iter().rev() {
            buf.extend_from_slice(&s[end - width..end]);
            end -= width;
        }
    })
}

/// Rewrites each decodable character with `f`, copying other bytes as-is.
fn map_chars<F>(s: &[u8], buf: &mut Vec<u8>, mut f: F)
where
    F: FnMut(char, &mut String),
{
    if let Ok(text) = std::str::from_utf8(s) {
        let mut mapped = String::with_capacity(text.len());
        for c in text.chars() {
            f(c, &mut mapped);
        }
        buf.extend_from_slice(mapped.as_bytes());
        return;
    }
    let mut mapped = String::new();
    for (c, unit) in runes(s) {
        if c == char::REPLACEMENT_CHARACTER && unit.len() == 1 {
            buf.extend_from_slice(unit);
            continue;
        }
        mapped.clear();
        f(c, &mut mapped);
        buf.extend_from_slice(mapped.as_bytes());
    }
}
