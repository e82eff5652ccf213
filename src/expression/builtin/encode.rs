//! Encoding functions: QUOTE, HEX, UNHEX, BIN, OCT, TO_BASE64, FROM_BASE64
//! and CHAR.

use std::fmt::Write as _;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use super::{len_u64, map_string};
use crate::chunk::{Chunk, Column};
use crate::context::{EvalContext, EvalWarning};
use crate::error::Result;
use crate::expression::ScalarFunction;

/// Standard alphabet, padding required, stray low bits in the final
/// quantum tolerated.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// QUOTE(str). A NULL operand yields the four-letter word `NULL`, not NULL.
pub(super) fn eval_quote(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let arg = func.eval_arg(ctx, 0, input)?;
    let mut buf = Vec::new();
    for i in 0..input.num_rows() {
        if arg.is_null(i) {
            out.append_bytes(b"NULL");
            continue;
        }
        buf.clear();
        quote(arg.get_bytes(i), &mut buf);
        out.append_bytes(&buf);
    }
    Ok(())
}

fn quote(s: &[u8], buf: &mut Vec<u8>) {
    buf.reserve(s.len() + 2);
    buf.push(b'\'');
    for &b in s {
        match b {
            b'\\' | b'\'' => buf.extend_from_slice(&[b'\\', b]),
            0 => buf.extend_from_slice(b"\\0"),
            0x1A => buf.extend_from_slice(b"\\Z"),
            _ => buf.push(b),
        }
    }
    buf.push(b'\'');
}

fn push_hex_upper(bytes: &[u8], buf: &mut Vec<u8>) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    for &b in bytes {
        buf.push(DIGITS[usize::from(b >> 4)]);
        buf.push(DIGITS[usize::from(b & 0x0F)]);
    }
}

pub(super) fn eval_hex_str(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_string(func, ctx, input, out, push_hex_upper)
}

/// Shared loop for integer-to-text radix conversions. Negative values are
/// read as their 64-bit two's complement.
fn map_int_to_string<F>(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mut render: F,
) -> Result<()>
where
    F: FnMut(u64, &mut String),
{
    let arg = func.eval_arg(ctx, 0, input)?;
    let mut text = String::new();
    for i in 0..input.num_rows() {
        if arg.is_null(i) {
            out.append_null();
            continue;
        }
        text.clear();
        render(arg.get_i64(i) as u64, &mut text);
        out.append_str(&text);
    }
    Ok(())
}

pub(super) fn eval_hex_int(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_int_to_string(func, ctx, input, out, |v, text| {
        let _ = write!(text, "{v:X}");
    })
}

pub(super) fn eval_bin(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_int_to_string(func, ctx, input, out, |v, text| {
        let _ = write!(text, "{v:b}");
    })
}

pub(super) fn eval_oct_int(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    map_int_to_string(func, ctx, input, out, |v, text| {
        let _ = write!(text, "{v:o}");
    })
}

/// UNHEX(str). An odd digit count gets a leading zero; any non-hex digit
/// gives NULL.
pub(super) fn eval_unhex(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let arg = func.eval_arg(ctx, 0, input)?;
    let mut buf = Vec::new();
    for i in 0..input.num_rows() {
        if arg.is_null(i) {
            out.append_null();
            continue;
        }
        buf.clear();
        if unhex(arg.get_bytes(i), &mut buf) {
            out.append_bytes(&buf);
        } else {
            out.append_null();
        }
    }
    Ok(())
}

fn unhex(s: &[u8], buf: &mut Vec<u8>) -> bool {
    fn nibble(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    }

    let (head, rest) = if s.len() % 2 == 1 {
        (Some(s[0]), &s[1..])
    } else {
        (None, s)
    };
    if let Some(c) = head {
        let Some(lo) = nibble(c) else {
            return false;
        };
        buf.push(lo);
    }
    for pair in rest.chunks_exact(2) {
        let (Some(hi), Some(lo)) = (nibble(pair[0]), nibble(pair[1])) else {
            return false;
        };
        buf.push(hi << 4 | lo);
    }
    true
}

/// OCT(str): the leading decimal integer of `str` in base 8.
///
/// An empty string gives NULL, a string without digits gives `0`, and a
/// magnitude beyond 64 bits saturates.
pub(super) fn eval_oct_string(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let arg = func.eval_arg(ctx, 0, input)?;
    for i in 0..input.num_rows() {
        let s = arg.get_bytes(i);
        if arg.is_null(i) || s.is_empty() {
            out.append_null();
            continue;
        }
        out.append_str(&format!("{:o}", leading_u64(s)));
    }
    Ok(())
}

fn leading_u64(s: &[u8]) -> u64 {
    let start = s.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(s.len());
    let s = &s[start..];
    let (negative, digits) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let mut value = 0u64;
    for &d in &digits[..end] {
        match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(d - b'0')))
        {
            Some(v) => value = v,
            None => return u64::MAX,
        }
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// TO_BASE64(str), wrapped with `\n` every `base64_line_width` characters
/// once the output is longer than one line.
pub(super) fn eval_to_base64(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let arg = func.eval_arg(ctx, 0, input)?;
    let width = ctx.config().base64_line_width.max(1);
    let mut encoded = String::new();
    for i in 0..input.num_rows() {
        if arg.is_null(i) {
            out.append_null();
            continue;
        }
        let s = arg.get_bytes(i);
        if !ctx.admit_output("to_base64", encoded_len(s.len(), width))? {
            out.append_null();
            continue;
        }
        encoded.clear();
        BASE64.encode_string(s, &mut encoded);
        if encoded.len() > width {
            let bytes = encoded.as_bytes();
            let lines = bytes.chunks(width);
            let mut first = true;
            out.append_concat(lines.flat_map(|line| {
                let lead: &[u8] = if first { b"" } else { b"\n" };
                first = false;
                [lead, line]
            }));
        } else {
            out.append_str(&encoded);
        }
    }
    Ok(())
}

/// Projected TO_BASE64 length, line breaks included.
fn encoded_len(n: usize, width: usize) -> u64 {
    let body = len_u64(n).div_ceil(3).saturating_mul(4);
    let width = len_u64(width);
    let breaks = if body > width { (body - 1) / width } else { 0 };
    body.saturating_add(breaks)
}

/// FROM_BASE64(str). Whitespace is ignored; malformed input gives NULL.
pub(super) fn eval_from_base64(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let arg = func.eval_arg(ctx, 0, input)?;
    let mut compact = Vec::new();
    let mut decoded = Vec::new();
    for i in 0..input.num_rows() {
        if arg.is_null(i) {
            out.append_null();
            continue;
        }
        let s = arg.get_bytes(i);
        let projected = len_u64(s.len()).div_ceil(4).saturating_mul(3);
        if !ctx.admit_output("from_base64", projected)? {
            out.append_null();
            continue;
        }
        compact.clear();
        compact.extend(
            s.iter()
                .copied()
                .filter(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n')),
        );
        decoded.clear();
        match BASE64.decode_vec(&compact, &mut decoded) {
            Ok(()) => out.append_bytes(&decoded),
            Err(_) => out.append_null(),
        }
    }
    Ok(())
}

/// CHAR(n, ...). NULL operands are skipped; each integer contributes its
/// significant bytes (at most four), most significant first.
///
/// With a non-binary result type the bytes must be valid UTF-8. Invalid
/// output records a warning and is kept as raw bytes, or becomes NULL in
/// strict mode.
pub(super) fn eval_char(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let args = func.eval_args_from(ctx, 0, input)?;
    let validate = !func.field_type().is_binary_string();
    let mut buf = Vec::new();
    for i in 0..input.num_rows() {
        buf.clear();
        for arg in args.iter().filter(|a| !a.is_null(i)) {
            push_char_bytes(arg.get_i64(i), &mut buf);
        }
        if validate && std::str::from_utf8(&buf).is_err() {
            let mut hex = Vec::with_capacity(buf.len() * 2);
            push_hex_upper(&buf, &mut hex);
            ctx.warn(EvalWarning::InvalidCharacterString {
                charset: "utf8mb4",
                hex: String::from_utf8_lossy(&hex).into_owned(),
            });
            if ctx.is_strict() {
                out.append_null();
                continue;
            }
        }
        out.append_bytes(&buf);
    }
    Ok(())
}

fn push_char_bytes(value: i64, buf: &mut Vec<u8>) {
    let mut le = [0u8; 4];
    let mut count = 0;
    let mut v = value;
    while count < 4 {
        le[count] = (v & 0xFF) as u8;
        count += 1;
        v >>= 8;
        if v == 0 {
            break;
        }
    }
    buf.extend(le[..count].iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(s: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        quote(s, &mut buf);
        buf
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quoted(b"Don't!"), b"'Don\\'t!'");
        assert_eq!(quoted(b"a\\b\0c\x1a"), b"'a\\\\b\\0c\\Z'");
        assert_eq!(quoted(b""), b"''");
    }

    #[test]
    fn test_unhex() {
        let mut buf = Vec::new();
        assert!(unhex(b"4D7953514C", &mut buf));
        assert_eq!(buf, b"MySQL");
        buf.clear();
        assert!(unhex(b"F", &mut buf));
        assert_eq!(buf, [0x0F]);
        buf.clear();
        assert!(!unhex(b"GG", &mut buf));
    }

    #[test]
    fn test_leading_u64() {
        assert_eq!(leading_u64(b" 12abc"), 12);
        assert_eq!(leading_u64(b"abc"), 0);
        assert_eq!(leading_u64(b"-1"), u64::MAX);
        assert_eq!(leading_u64(b"99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_char_bytes() {
        let mut buf = Vec::new();
        push_char_bytes(77, &mut buf);
        push_char_bytes(0, &mut buf);
        push_char_bytes(0x0100, &mut buf);
        assert_eq!(buf, [77, 0, 1, 0]);
        buf.clear();
        push_char_bytes(-1, &mut buf);
        assert_eq!(buf, [0xFF; 4]);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(3, 76), 4);
        assert_eq!(encoded_len(57, 76), 76);
        assert_eq!(encoded_len(60, 76), 80 + 1);
    }

    #[test]
    fn test_base64_engine_is_lenient_on_trailing_bits() {
        assert_eq!(BASE64.decode("YWJj").unwrap(), b"abc");
        assert_eq!(BASE64.decode("YR==").unwrap(), b"a");
        assert!(BASE64.decode("YQ").is_err());
    }
}
