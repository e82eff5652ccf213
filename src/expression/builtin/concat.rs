//! Functions that build strings out of repeated or combined operands:
//! REPEAT, SPACE, CONCAT, CONCAT_WS, REPLACE, EXPORT_SET, MAKE_SET and ELT.

use super::{clamp_len, len_u64};
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::find_bytes;
use crate::expression::ScalarFunction;

pub(super) fn eval_repeat(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let strs = func.eval_arg(ctx, 0, input)?;
    let counts = func.eval_arg(ctx, 1, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*counts]);
    let flen = len_u64(func.result_flen(ctx));
    let max_count = ctx.config().max_repeat_count.max(1);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let count = counts.get_i64(i);
        if count < 1 {
            out.append_bytes(b"");
            continue;
        }
        // Clamped so the product below cannot overflow.
        let count = count.min(max_count).unsigned_abs();
        let s = strs.get_bytes(i);
        let projected = len_u64(s.len()).saturating_mul(count);
        if !ctx.admit_output("repeat", projected)? {
            out.append_null();
            continue;
        }
        if len_u64(s.len()) > flen / count {
            out.append_null();
            continue;
        }
        if s.is_empty() {
            out.append_bytes(b"");
            continue;
        }
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        out.append_concat(std::iter::repeat(s).take(count));
    }
    Ok(())
}

pub(super) fn eval_space(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let counts = func.eval_arg(ctx, 0, input)?;
    let flen = func.result_flen(ctx);
    let mut spaces = Vec::new();

    for i in 0..input.num_rows() {
        if counts.is_null(i) {
            out.append_null();
            continue;
        }
        let count = clamp_len(counts.get_i64(i));
        if !ctx.admit_output("space", len_u64(count))? {
            out.append_null();
            continue;
        }
        if count > flen {
            out.append_null();
            continue;
        }
        if spaces.len() < count {
            spaces.resize(count, b' ');
        }
        out.append_bytes(&spaces[..count]);
    }
    Ok(())
}

pub(super) fn eval_concat(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let args = func.eval_args_from(ctx, 0, input)?;
    let refs: Vec<&Column> = args.iter().map(|a| &**a).collect();
    let nulls = Column::union_nulls(&refs);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let projected: u64 = refs.iter().map(|c| len_u64(c.get_bytes(i).len())).sum();
        if !ctx.admit_output("concat", projected)? {
            out.append_null();
            continue;
        }
        out.append_concat(refs.iter().map(|c| c.get_bytes(i)));
    }
    Ok(())
}

/// NULL separator gives NULL; NULL arguments after it are skipped.
pub(super) fn eval_concat_ws(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let seps = func.eval_arg(ctx, 0, input)?;
    let args = func.eval_args_from(ctx, 1, input)?;
    let mut parts: Vec<&[u8]> = Vec::with_capacity(args.len() * 2);

    for i in 0..input.num_rows() {
        if seps.is_null(i) {
            out.append_null();
            continue;
        }
        let sep = seps.get_bytes(i);
        parts.clear();
        let mut projected = 0u64;
        for arg in args.iter().filter(|a| !a.is_null(i)) {
            if !parts.is_empty() {
                parts.push(sep);
                projected += len_u64(sep.len());
            }
            let s = arg.get_bytes(i);
            parts.push(s);
            projected += len_u64(s.len());
        }
        if !ctx.admit_output("concat_ws", projected)? {
            out.append_null();
            continue;
        }
        out.append_concat(parts.iter().copied());
    }
    Ok(())
}

/// An empty search string leaves the subject unchanged.
pub(super) fn eval_replace(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let strs = func.eval_arg(ctx, 0, input)?;
    let froms = func.eval_arg(ctx, 1, input)?;
    let tos = func.eval_arg(ctx, 2, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*froms, &*tos]);
    let mut buf = Vec::new();

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let (s, from, to) = (strs.get_bytes(i), froms.get_bytes(i), tos.get_bytes(i));
        if from.is_empty() {
            out.append_bytes(s);
            continue;
        }
        buf.clear();
        let mut rest = s;
        while let Some(pos) = find_bytes(rest, from) {
            buf.extend_from_slice(&rest[..pos]);
            buf.extend_from_slice(to);
            rest = &rest[pos + from.len()..];
        }
        buf.extend_from_slice(rest);
        out.append_bytes(&buf);
    }
    Ok(())
}

/// EXPORT_SET(bits, on, off[, separator[, number_of_bits]]).
pub(super) fn eval_export_set(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let bits = func.eval_arg(ctx, 0, input)?;
    let ons = func.eval_arg(ctx, 1, input)?;
    let offs = func.eval_arg(ctx, 2, input)?;
    let seps = if func.args().len() > 3 {
        Some(func.eval_arg(ctx, 3, input)?)
    } else {
        None
    };
    let widths = if func.args().len() > 4 {
        Some(func.eval_arg(ctx, 4, input)?)
    } else {
        None
    };

    let mut operands: Vec<&Column> = vec![&*bits, &*ons, &*offs];
    operands.extend(seps.as_deref());
    operands.extend(widths.as_deref());
    let nulls = Column::union_nulls(&operands);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let sep = seps.as_ref().map_or(&b","[..], |c| c.get_bytes(i));
        let width = widths.as_ref().map_or(64, |c| c.get_i64(i));
        let width = if (0..=64).contains(&width) { width } else { 64 };
        out.append_concat(export_set(
            bits.get_i64(i) as u64,
            ons.get_bytes(i),
            offs.get_bytes(i),
            sep,
            width as u32,
        ));
    }
    Ok(())
}

fn export_set<'a>(
    bits: u64,
    on: &'a [u8],
    off: &'a [u8],
    sep: &'a [u8],
    width: u32,
) -> impl Iterator<Item = &'a [u8]> {
    (0..width).flat_map(move |bit| {
        let value = if bits & (1u64 << bit) != 0 { on } else { off };
        let lead = if bit == 0 { None } else { Some(sep) };
        lead.into_iter().chain(std::iter::once(value))
    })
}

/// MAKE_SET(bits, str1, str2, ...). NULL strings are skipped.
pub(super) fn eval_make_set(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let bits = func.eval_arg(ctx, 0, input)?;
    let strs = func.eval_args_from(ctx, 1, input)?;
    let mut parts: Vec<&[u8]> = Vec::with_capacity(strs.len() * 2);

    for i in 0..input.num_rows() {
        if bits.is_null(i) {
            out.append_null();
            continue;
        }
        let mask = bits.get_i64(i) as u64;
        parts.clear();
        for (j, s) in strs.iter().enumerate() {
            let selected = u32::try_from(j)
                .ok()
                .and_then(|j| 1u64.checked_shl(j))
                .is_some_and(|bit| mask & bit != 0);
            if !selected || s.is_null(i) {
                continue;
            }
            if !parts.is_empty() {
                parts.push(b",");
            }
            parts.push(s.get_bytes(i));
        }
        out.append_concat(parts.iter().copied());
    }
    Ok(())
}

/// ELT(n, str1, str2, ...). Only the selected string takes part in null
/// propagation.
///
/// A string operand is evaluated only over the rows that select it, one run
/// of consecutive rows at a time, so warnings and strict-mode errors come
/// from exactly the rows a row-at-a-time pass would evaluate, in row order.
pub(super) fn eval_elt(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let indexes = func.eval_arg(ctx, 0, input)?;
    let arg_count = func.args().len();
    let selected: Vec<Option<usize>> = (0..input.num_rows())
        .map(|i| {
            if indexes.is_null(i) {
                return None;
            }
            usize::try_from(indexes.get_i64(i))
                .ok()
                .filter(|&j| j >= 1 && j < arg_count)
        })
        .collect();

    let mut start = 0;
    while start < selected.len() {
        let run = selected[start..]
            .iter()
            .take_while(|&&j| j == selected[start])
            .count();
        match selected[start] {
            None => {
                for _ in 0..run {
                    out.append_null();
                }
            }
            Some(j) => {
                let rows = input.slice(start, run);
                let strs = func.eval_arg(ctx, j, &rows)?;
                for k in 0..run {
                    out.append_from(&strs, k)?;
                }
            }
        }
        start += run;
    }
    Ok(())
}
