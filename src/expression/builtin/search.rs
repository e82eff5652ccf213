//! LOCATE, INSTR and FIND_IN_SET.
//!
//! Positions are 1-based; 0 means not found. Byte variants count bytes and
//! compare exactly. The `_utf8` variants count code points and fold case
//! when the function collation is case-insensitive.

use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::{find_bytes, find_chars, fold_chars};
use crate::expression::ScalarFunction;

/// Shared loop for two string operands and an optional integer, producing
/// an integer per row.
fn eval_search<F>(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mut op: F,
) -> Result<()>
where
    F: FnMut(&[u8], &[u8], Option<i64>) -> i64,
{
    let first = func.eval_arg(ctx, 0, input)?;
    let second = func.eval_arg(ctx, 1, input)?;
    let third = if func.args().len() > 2 {
        Some(func.eval_arg(ctx, 2, input)?)
    } else {
        None
    };

    out.reserve(input.num_rows());
    for i in 0..input.num_rows() {
        let extra = third.as_ref().map(|c| c.get_i64(i));
        out.append_i64(op(first.get_bytes(i), second.get_bytes(i), extra));
    }
    out.merge_nulls(&[&*first, &*second]);
    if let Some(third) = &third {
        out.merge_nulls(&[&**third]);
    }
    Ok(())
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// LOCATE(substr, str[, pos]) by byte.
pub(super) fn eval_locate(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_search(func, ctx, input, out, |sub, s, pos| match pos {
        None => find_bytes(s, sub).map_or(0, |p| to_i64(p) + 1),
        Some(pos) => locate_from(s.len(), sub.len(), pos, |start| {
            find_bytes(&s[start..], sub)
        }),
    })
}

/// LOCATE(substr, str[, pos]) by code point.
pub(super) fn eval_locate_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let fold = func.collation().is_case_insensitive();
    eval_search(func, ctx, input, out, |sub, s, pos| {
        let sub = fold_chars(sub, fold);
        let s = fold_chars(s, fold);
        match pos {
            None => find_chars(&s, &sub).map_or(0, |p| to_i64(p) + 1),
            Some(pos) => locate_from(s.len(), sub.len(), pos, |start| {
                find_chars(&s[start..], &sub)
            }),
        }
    })
}

/// Three-argument LOCATE over `total` units with a needle of `sub_len`.
///
/// `find` searches from a 0-based start and returns the offset of the match
/// relative to that start.
fn locate_from<F>(total: usize, sub_len: usize, pos: i64, find: F) -> i64
where
    F: FnOnce(usize) -> Option<usize>,
{
    let start = pos.saturating_sub(1);
    if start < 0 || start > to_i64(total) - to_i64(sub_len) {
        return 0;
    }
    if sub_len == 0 {
        return start + 1;
    }
    let Ok(from) = usize::try_from(start) else {
        return 0;
    };
    find(from).map_or(0, |p| start + to_i64(p) + 1)
}

/// INSTR(str, substr) by byte.
pub(super) fn eval_instr(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    eval_search(func, ctx, input, out, |s, sub, _| {
        find_bytes(s, sub).map_or(0, |p| to_i64(p) + 1)
    })
}

/// INSTR(str, substr) by code point.
pub(super) fn eval_instr_utf8(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let fold = func.collation().is_case_insensitive();
    eval_search(func, ctx, input, out, |s, sub, _| {
        find_chars(&fold_chars(s, fold), &fold_chars(sub, fold)).map_or(0, |p| to_i64(p) + 1)
    })
}

/// FIND_IN_SET(str, strlist): 1-based index of the first comma-separated
/// element of `strlist` equal to `str` under the function collation.
pub(super) fn eval_find_in_set(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let collation = func.collation();
    eval_search(func, ctx, input, out, |s, list, _| {
        if list.is_empty() {
            return 0;
        }
        list.split(|&b| b == b',')
            .position(|item| collation.compare(s, item).is_eq())
            .map_or(0, |p| to_i64(p) + 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate3(sub: &str, s: &str, pos: i64) -> i64 {
        let (sub, s) = (sub.as_bytes(), s.as_bytes());
        locate_from(s.len(), sub.len(), pos, |start| find_bytes(&s[start..], sub))
    }

    #[test]
    fn test_locate_from() {
        assert_eq!(locate3("bar", "foobarbar", 5), 7);
        assert_eq!(locate3("bar", "foobarbar", 1), 4);
        assert_eq!(locate3("", "abc", 2), 2);
        assert_eq!(locate3("", "abc", 4), 4);
        assert_eq!(locate3("", "abc", 5), 0);
        assert_eq!(locate3("a", "abc", 0), 0);
        assert_eq!(locate3("a", "abc", i64::MIN), 0);
        assert_eq!(locate3("abcd", "abc", 1), 0);
    }
}
