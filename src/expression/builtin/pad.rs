//! LPAD and RPAD, by byte and by code point.

use super::len_u64;
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::expression::text::{char_len, char_prefix_len};
use crate::expression::ScalarFunction;
use crate::types::MAX_BYTES_PER_CHARACTER;

/// Which side is padded and how lengths are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PadMode {
    LeftBytes,
    RightBytes,
    LeftChars,
    RightChars,
}

impl PadMode {
    fn is_left(self) -> bool {
        matches!(self, PadMode::LeftBytes | PadMode::LeftChars)
    }

    fn by_char(self) -> bool {
        matches!(self, PadMode::LeftChars | PadMode::RightChars)
    }

    fn name(self) -> &'static str {
        if self.is_left() {
            "lpad"
        } else {
            "rpad"
        }
    }
}

/// LPAD/RPAD(str, len, padstr).
///
/// Row policy, in order:
/// - NULL `str` or `len` gives NULL;
/// - a negative `len` gives NULL;
/// - a projected size over the packet budget goes through the guard
///   (character variants project four bytes per character);
/// - NULL `padstr` gives NULL;
/// - a `len` over the declared result width gives NULL;
/// - padding needed with an empty `padstr` gives NULL;
/// - otherwise the result is `str` padded, or truncated, to `len`.
pub(super) fn eval_pad(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mode: PadMode,
) -> Result<()> {
    let strs = func.eval_arg(ctx, 0, input)?;
    let lengths = func.eval_arg(ctx, 1, input)?;
    let pads = func.eval_arg(ctx, 2, input)?;
    let nulls = Column::union_nulls(&[&*strs, &*lengths]);
    let flen = len_u64(func.result_flen(ctx));
    let width = if mode.by_char() {
        len_u64(MAX_BYTES_PER_CHARACTER)
    } else {
        1
    };
    let mut buf = Vec::new();

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let Ok(target) = u64::try_from(lengths.get_i64(i)) else {
            out.append_null();
            continue;
        };
        let projected = target.saturating_mul(width);
        if !ctx.admit_output(mode.name(), projected)? {
            out.append_null();
            continue;
        }
        if pads.is_null(i) || projected > flen {
            out.append_null();
            continue;
        }
        let target = usize::try_from(target).unwrap_or(usize::MAX);
        buf.clear();
        if pad_one(strs.get_bytes(i), target, pads.get_bytes(i), mode, &mut buf) {
            out.append_bytes(&buf);
        } else {
            out.append_null();
        }
    }
    Ok(())
}

/// Pads or truncates `s` to `target` units into `buf`.
///
/// Returns false when padding is needed but `pad` is empty.
fn pad_one(s: &[u8], target: usize, pad: &[u8], mode: PadMode, buf: &mut Vec<u8>) -> bool {
    let (len, pad_len) = if mode.by_char() {
        (char_len(s), char_len(pad))
    } else {
        (s.len(), pad.len())
    };
    if target <= len {
        let end = if mode.by_char() {
            char_prefix_len(s, target)
        } else {
            target
        };
        buf.extend_from_slice(&s[..end]);
        return true;
    }
    if pad_len == 0 {
        return false;
    }

    let fill = target - len;
    let (whole, rest) = (fill / pad_len, fill % pad_len);
    let rest_bytes = if mode.by_char() {
        char_prefix_len(pad, rest)
    } else {
        rest
    };
    if !mode.is_left() {
        buf.extend_from_slice(s);
    }
    for _ in 0..whole {
        buf.extend_from_slice(pad);
    }
    buf.extend_from_slice(&pad[..rest_bytes]);
    if mode.is_left() {
        buf.extend_from_slice(s);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(s: &str, target: usize, p: &str, mode: PadMode) -> Option<String> {
        let mut buf = Vec::new();
        pad_one(s.as_bytes(), target, p.as_bytes(), mode, &mut buf)
            .then(|| String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_pad_bytes() {
        assert_eq!(pad("hi", 5, "?!", PadMode::LeftBytes).as_deref(), Some("?!?hi"));
        assert_eq!(pad("hi", 5, "?!", PadMode::RightBytes).as_deref(), Some("hi?!?"));
        assert_eq!(pad("hello", 2, "?", PadMode::LeftBytes).as_deref(), Some("he"));
        assert_eq!(pad("abc", 0, "x", PadMode::RightBytes).as_deref(), Some(""));
    }

    #[test]
    fn test_empty_pad() {
        assert_eq!(pad("abc", 5, "", PadMode::LeftBytes), None);
        assert_eq!(pad("abc", 3, "", PadMode::LeftBytes).as_deref(), Some("abc"));
        assert_eq!(pad("abc", 2, "", PadMode::RightChars).as_deref(), Some("ab"));
    }

    #[test]
    fn test_pad_chars() {
        assert_eq!(pad("é", 4, "àb", PadMode::LeftChars).as_deref(), Some("àbàé"));
        assert_eq!(pad("héllo", 2, "x", PadMode::RightChars).as_deref(), Some("hé"));
    }
}
