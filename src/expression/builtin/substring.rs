//! LEFT, RIGHT, SUBSTRING, SUBSTRING_INDEX and INSERT.
//!
//! Each has a byte variant that slices at byte offsets (and may split a
//! multi-byte character) and, where it matters, a `_utf8` variant that
//! counts code points and never does.

use super::{clamp_len, len_u64};
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::{
    char_len, char_prefix_len, char_range, char_suffix_start, find_bytes,
};
use crate::expression::ScalarFunction;

/// Shared loop for the `(str, int)` functions.
fn eval_str_int<F>(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mut slice: F,
) -> Result<()>
where
    F: FnMut(&[u8], i64) -> (usize, usize),
{
    let strs = func.eval_arg(ctx, 0, input)?;
    let nums = func.eval_arg(ctx, 1, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*nums]);
    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let s = strs.get_bytes(i);
        let (begin, end) = slice(s, nums.get_i64(i));
        out.append_bytes(&s[begin..end]);
    }
    Ok(())
}

pub(super) fn eval_left(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_str_int(func, ctx, input, out, |s, n| (0, clamp_len(n).min(s.len())))
}

pub(super) fn eval_right(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_str_int(func, ctx, input, out, |s, n| {
        (s.len() - clamp_len(n).min(s.len()), s.len())
    })
}

pub(super) fn eval_left_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_str_int(func, ctx, input, out, |s, n| (0, char_prefix_len(s, clamp_len(n))))
}

pub(super) fn eval_right_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_str_int(func, ctx, input, out, |s, n| {
        (char_suffix_start(s, clamp_len(n)), s.len())
    })
}

/// Resolves a 1-based (or negative, from the end) position and an optional
/// length against a string of `total` units into a `[begin, end)` range.
fn substring_range(total: usize, pos: i64, len: Option<i64>) -> (usize, usize) {
    let total_i = i64::try_from(total).unwrap_or(i64::MAX);
    let mut start = if pos < 0 { pos.saturating_add(total_i) } else { pos - 1 };
    if start < 0 || start > total_i {
        start = total_i;
    }
    let end = match len {
        None => total_i,
        Some(len) => {
            let end = start.saturating_add(len);
            if end < start {
                return (clamp_len(start), clamp_len(start));
            }
            end.min(total_i)
        }
    };
    (clamp_len(start), clamp_len(end))
}

/// SUBSTRING(str, pos[, len]) by byte.
pub(super) fn eval_substring(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_substring_with(func, ctx, input, out, |s, pos, len| {
        substring_range(s.len(), pos, len)
    })
}

/// SUBSTRING(str, pos[, len]) by code point.
pub(super) fn eval_substring_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_substring_with(func, ctx, input, out, |s, pos, len| {
        let (begin, end) = substring_range(char_len(s), pos, len);
        char_range(s, begin, end - begin)
    })
}

fn eval_substring_with<F>(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mut range: F,
) -> Result<()>
where
    F: FnMut(&[u8], i64, Option<i64>) -> (usize, usize),
{
    let strs = func.eval_arg(ctx, 0, input)?;
    let positions = func.eval_arg(ctx, 1, input)?;
    let lengths = if func.args().len() > 2 {
        Some(func.eval_arg(ctx, 2, input)?)
    } else {
        None
    };
    let mut operands: Vec<&Column> = vec![&*strs, &*positions];
    operands.extend(lengths.as_deref());
    let nulls = Column::union_nulls(&operands);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let s = strs.get_bytes(i);
        let len = lengths.as_ref().map(|c| c.get_i64(i));
        let (begin, end) = range(s, positions.get_i64(i), len);
        out.append_bytes(&s[begin..end]);
    }
    Ok(())
}

/// SUBSTRING_INDEX(str, delim, count).
pub(super) fn eval_substring_index(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let strs = func.eval_arg(ctx, 0, input)?;
    let delims = func.eval_arg(ctx, 1, input)?;
    let counts = func.eval_arg(ctx, 2, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*delims, &*counts]);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let (s, delim) = (strs.get_bytes(i), delims.get_bytes(i));
        let (begin, end) = substring_index(s, delim, counts.get_i64(i));
        out.append_bytes(&s[begin..end]);
    }
    Ok(())
}

/// Byte range kept by SUBSTRING_INDEX.
fn substring_index(s: &[u8], delim: &[u8], count: i64) -> (usize, usize) {
    if delim.is_empty() {
        return (0, 0);
    }
    // Start offsets of non-overlapping delimiter matches, left to right.
    let mut hits = Vec::new();
    let mut at = 0;
    while let Some(pos) = find_bytes(&s[at..], delim) {
        hits.push(at + pos);
        at += pos + delim.len();
    }
    let parts = hits.len() + 1;

    if count > 0 {
        let keep = clamp_len(count);
        if keep >= parts {
            (0, s.len())
        } else {
            (0, hits[keep - 1])
        }
    } else {
        // -i64::MIN does not exist; such a count keeps everything.
        let Some(keep) = count.checked_neg().map(clamp_len) else {
            return (0, s.len());
        };
        if keep >= parts {
            (0, s.len())
        } else if keep == 0 {
            (s.len(), s.len())
        } else {
            (hits[parts - keep - 1] + delim.len(), s.len())
        }
    }
}

/// INSERT(str, pos, len, newstr) by byte.
pub(super) fn eval_insert(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_insert_with(func, ctx, input, out, false)
}

/// INSERT(str, pos, len, newstr) by code point.
pub(super) fn eval_insert_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_insert_with(func, ctx, input, out, true)
}

fn eval_insert_with(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    by_char: bool,
) -> Result<()> {
    let strs = func.eval_arg(ctx, 0, input)?;
    let positions = func.eval_arg(ctx, 1, input)?;
    let lengths = func.eval_arg(ctx, 2, input)?;
    let news = func.eval_arg(ctx, 3, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*positions, &*lengths, &*news]);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let s = strs.get_bytes(i);
        let units = if by_char { char_len(s) } else { s.len() };
        let units_i = i64::try_from(units).unwrap_or(i64::MAX);
        let pos = positions.get_i64(i);
        if pos < 1 || pos > units_i {
            out.append_bytes(s);
            continue;
        }
        let remaining = units_i - pos + 1;
        let mut len = lengths.get_i64(i);
        if len < 0 || len > remaining {
            len = remaining;
        }
        let (head_units, tail_units) = (clamp_len(pos - 1), clamp_len(pos - 1 + len));
        let (head_end, tail_start) = if by_char {
            (char_prefix_len(s, head_units), char_prefix_len(s, tail_units))
        } else {
            (head_units, tail_units)
        };
        let new = news.get_bytes(i);
        let projected = len_u64(head_end + new.len() + (s.len() - tail_start));
        if !ctx.admit_output("insert", projected)? {
            out.append_null();
            continue;
        }
        out.append_concat([&s[..head_end], new, &s[tail_start..]]);
    }
    Ok(())
}
