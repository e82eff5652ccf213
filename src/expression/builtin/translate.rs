//! TRANSLATE(str, from, to).
//!
//! Every unit of `from` maps to the unit at the same position in `to`.
//! The first occurrence of a repeated unit wins, and units of `from` past
//! the end of `to` are deleted. Units are bytes, or code points for the
//! `_utf8` variant.

use std::collections::HashMap;

use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::runes;
use crate::expression::ScalarFunction;

/// A replacement table: `None` for units passed through, `Some(None)` for
/// deleted units.
enum TranslateMap {
    Bytes(Box<[Option<Option<u8>>; 256]>),
    Chars(HashMap<char, Option<char>>),
}

impl TranslateMap {
    fn build(ctx: &EvalContext, from: &[u8], to: &[u8], utf8: bool) -> Self {
        ctx.stats().record_translate_map();
        if utf8 {
            let mut map = HashMap::new();
            let mut targets = runes(to).map(|(c, _)| c);
            for (c, _) in runes(from) {
                let target = targets.next();
                map.entry(c).or_insert(target);
            }
            TranslateMap::Chars(map)
        } else {
            let mut table = Box::new([None; 256]);
            for (i, &b) in from.iter().enumerate() {
                let slot = &mut table[usize::from(b)];
                if slot.is_none() {
                    *slot = Some(to.get(i).copied());
                }
            }
            TranslateMap::Bytes(table)
        }
    }

    fn apply(&self, s: &[u8], buf: &mut Vec<u8>) {
        match self {
            TranslateMap::Bytes(table) => {
                for &b in s {
                    match table[usize::from(b)] {
                        None => buf.push(b),
                        Some(Some(t)) => buf.push(t),
                        Some(None) => {}
                    }
                }
            }
            TranslateMap::Chars(map) => {
                let mut utf8 = [0u8; 4];
                for (c, raw) in runes(s) {
                    // Invalid bytes decode as U+FFFD; they pass through
                    // untouched.
                    let valid = c != char::REPLACEMENT_CHARACTER || raw.len() == 3;
                    match map.get(&c).filter(|_| valid) {
                        None => buf.extend_from_slice(raw),
                        Some(Some(t)) => buf.extend_from_slice(t.encode_utf8(&mut utf8).as_bytes()),
                        Some(None) => {}
                    }
                }
            }
        }
    }
}

/// When both `from` and `to` are constants the table is built once for the
/// batch, and a NULL constant makes every row NULL. Otherwise it is rebuilt
/// for each non-null row.
pub(super) fn eval_translate(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    utf8: bool,
) -> Result<()> {
    let n = input.num_rows();
    let args = func.args();
    let shared = match (args[1].constant_value(), args[2].constant_value()) {
        (Some(from), Some(to)) => match (from.as_bytes(), to.as_bytes()) {
            (Some(from), Some(to)) => Some(TranslateMap::build(ctx, from, to, utf8)),
            _ => {
                for _ in 0..n {
                    out.append_null();
                }
                return Ok(());
            }
        },
        _ => None,
    };

    let strs = func.eval_arg(ctx, 0, input)?;
    let froms = func.eval_arg(ctx, 1, input)?;
    let tos = func.eval_arg(ctx, 2, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*froms, &*tos]);
    let mut buf = Vec::new();

    for i in 0..n {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        buf.clear();
        if let Some(map) = &shared {
            map.apply(strs.get_bytes(i), &mut buf);
        } else {
            let map = TranslateMap::build(ctx, froms.get_bytes(i), tos.get_bytes(i), utf8);
            map.apply(strs.get_bytes(i), &mut buf);
        }
        out.append_bytes(&buf);
    }
    Ok(())
}
