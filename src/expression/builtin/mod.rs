//! Built-in scalar string functions.
//!
//! Every function is a variant of [`BuiltinFunction`]. The variant fixes the
//! signature (checked when a [`ScalarFunction`] is built) and selects the
//! evaluator; dispatch is one exhaustive `match`.
//!
//! Evaluators share one shape:
//! 1. evaluate each operand into a column leased from the context pool;
//! 2. combine the operand null bitmaps (unless the function documents an
//!    exception);
//! 3. compute non-null rows, checking projected lengths against the packet
//!    guard;
//! 4. let the leases drop, which returns the columns on every exit path.

mod case;
mod concat;
mod encode;
mod format;
mod length;
mod pad;
mod search;
mod substring;
mod translate;
mod trim;

use serde::{Deserialize, Serialize};

use super::function::ScalarFunction;
use crate::chunk::{Chunk, Column};
use crate::context::EvalContext;
use crate::error::Result;
use crate::types::EvalType;

/// Accepted evaluation type of one argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// Integer operand.
    Int,
    /// String operand.
    String,
    /// Any of integer, real or decimal.
    Numeric,
}

impl ArgType {
    /// Returns whether an operand of type `eval_type` fits this position.
    #[must_use]
    pub fn accepts(self, eval_type: EvalType) -> bool {
        match self {
            ArgType::Int => eval_type == EvalType::Int,
            ArgType::String => eval_type == EvalType::String,
            ArgType::Numeric => eval_type.is_numeric(),
        }
    }

    /// Evaluation type reported when an operand does not fit.
    #[must_use]
    pub fn expected(self) -> EvalType {
        match self {
            ArgType::Int => EvalType::Int,
            ArgType::String => EvalType::String,
            ArgType::Numeric => EvalType::Decimal,
        }
    }
}

/// Argument layout of a function: required positions, optional trailing
/// positions, then an optional repeated tail.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub required: &'static [ArgType],
    pub optional: &'static [ArgType],
    pub variadic: Option<ArgType>,
}

impl Signature {
    const fn fixed(required: &'static [ArgType]) -> Self {
        Signature {
            required,
            optional: &[],
            variadic: None,
        }
    }

    const fn with_optional(required: &'static [ArgType], optional: &'static [ArgType]) -> Self {
        Signature {
            required,
            optional,
            variadic: None,
        }
    }

    const fn variadic(required: &'static [ArgType], tail: ArgType) -> Self {
        Signature {
            required,
            optional: &[],
            variadic: Some(tail),
        }
    }

    /// Returns the expected type at argument position `i`, if any.
    #[must_use]
    pub fn arg_type(&self, i: usize) -> Option<ArgType> {
        let fixed = self.required.len();
        if i < fixed {
            return Some(self.required[i]);
        }
        self.optional.get(i - fixed).copied().or(self.variadic)
    }

    /// Returns whether `n` arguments are acceptable.
    #[must_use]
    pub fn accepts_count(&self, n: usize) -> bool {
        let min = self.required.len();
        n >= min && (self.variadic.is_some() || n <= min + self.optional.len())
    }

    /// Human-readable arity, for error messages.
    #[must_use]
    pub fn describe_count(&self) -> String {
        let min = self.required.len();
        let max = min + self.optional.len();
        if self.variadic.is_some() {
            format!("at least {min}")
        } else if max == min {
            min.to_string()
        } else {
            format!("{min} to {max}")
        }
    }
}

const S: ArgType = ArgType::String;
const I: ArgType = ArgType::Int;
const N: ArgType = ArgType::Numeric;

/// Closed set of built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinFunction {
    // String results.
    Lower,
    Upper,
    LowerUtf8,
    UpperUtf8,
    Repeat,
    Space,
    Reverse,
    ReverseUtf8,
    Concat,
    ConcatWs,
    Left,
    Right,
    LeftUtf8,
    RightUtf8,
    Substring,
    SubstringUtf8,
    SubstringIndex,
    Insert,
    InsertUtf8,
    Lpad,
    Rpad,
    LpadUtf8,
    RpadUtf8,
    LTrim,
    RTrim,
    Trim,
    Quote,
    HexStr,
    HexInt,
    Unhex,
    Bin,
    OctInt,
    OctString,
    ToBase64,
    FromBase64,
    Replace,
    ExportSet,
    MakeSet,
    Elt,
    Char,
    Format,
    Translate,
    TranslateUtf8,
    // Integer results.
    StringIsNull,
    Length,
    BitLength,
    CharLength,
    CharLengthUtf8,
    Ascii,
    Ord,
    Locate,
    LocateUtf8,
    Instr,
    InstrUtf8,
    FindInSet,
    Strcmp,
}

impl BuiltinFunction {
    /// Returns the SQL name, as used in warnings and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        use BuiltinFunction as F;
        match self {
            F::Lower | F::LowerUtf8 => "lower",
            F::Upper | F::UpperUtf8 => "upper",
            F::Repeat => "repeat",
            F::Space => "space",
            F::Reverse | F::ReverseUtf8 => "reverse",
            F::Concat => "concat",
            F::ConcatWs => "concat_ws",
            F::Left | F::LeftUtf8 => "left",
            F::Right | F::RightUtf8 => "right",
            F::Substring | F::SubstringUtf8 => "substring",
            F::SubstringIndex => "substring_index",
            F::Insert | F::InsertUtf8 => "insert",
            F::Lpad | F::LpadUtf8 => "lpad",
            F::Rpad | F::RpadUtf8 => "rpad",
            F::LTrim => "ltrim",
            F::RTrim => "rtrim",
            F::Trim => "trim",
            F::Quote => "quote",
            F::HexStr | F::HexInt => "hex",
            F::Unhex => "unhex",
            F::Bin => "bin",
            F::OctInt | F::OctString => "oct",
            F::ToBase64 => "to_base64",
            F::FromBase64 => "from_base64",
            F::Replace => "replace",
            F::ExportSet => "export_set",
            F::MakeSet => "make_set",
            F::Elt => "elt",
            F::Char => "char",
            F::Format => "format",
            F::Translate | F::TranslateUtf8 => "translate",
            F::StringIsNull => "isnull",
            F::Length => "length",
            F::BitLength => "bit_length",
            F::CharLength | F::CharLengthUtf8 => "char_length",
            F::Ascii => "ascii",
            F::Ord => "ord",
            F::Locate | F::LocateUtf8 => "locate",
            F::Instr | F::InstrUtf8 => "instr",
            F::FindInSet => "find_in_set",
            F::Strcmp => "strcmp",
        }
    }

    /// Returns the argument layout.
    #[must_use]
    pub fn signature(&self) -> Signature {
        use BuiltinFunction as F;
        match self {
            F::Lower
            | F::Upper
            | F::LowerUtf8
            | F::UpperUtf8
            | F::Reverse
            | F::ReverseUtf8
            | F::LTrim
            | F::RTrim
            | F::Quote
            | F::HexStr
            | F::Unhex
            | F::OctString
            | F::ToBase64
            | F::FromBase64
            | F::StringIsNull
            | F::Length
            | F::BitLength
            | F::CharLength
            | F::CharLengthUtf8
            | F::Ascii
            | F::Ord => Signature::fixed(&[S]),
            F::Space | F::HexInt | F::Bin | F::OctInt => Signature::fixed(&[I]),
            F::Repeat | F::Left | F::Right | F::LeftUtf8 | F::RightUtf8 => {
                Signature::fixed(&[S, I])
            }
            F::Concat => Signature::variadic(&[S], S),
            F::ConcatWs => Signature::variadic(&[S, S], S),
            F::Substring | F::SubstringUtf8 => Signature::with_optional(&[S, I], &[I]),
            F::SubstringIndex => Signature::fixed(&[S, S, I]),
            F::Insert | F::InsertUtf8 => Signature::fixed(&[S, I, I, S]),
            F::Lpad | F::Rpad | F::LpadUtf8 | F::RpadUtf8 => Signature::fixed(&[S, I, S]),
            F::Trim => Signature::with_optional(&[S], &[S, I]),
            F::Replace | F::Translate | F::TranslateUtf8 => Signature::fixed(&[S, S, S]),
            F::ExportSet => Signature::with_optional(&[I, S, S], &[S, I]),
            F::MakeSet | F::Elt => Signature::variadic(&[I, S], S),
            F::Char => Signature::variadic(&[I], I),
            F::Format => Signature::with_optional(&[N, I], &[S]),
            F::Locate | F::LocateUtf8 => Signature::with_optional(&[S, S], &[I]),
            F::Instr | F::InstrUtf8 | F::FindInSet | F::Strcmp => Signature::fixed(&[S, S]),
        }
    }

    /// Returns the evaluation type of the result.
    #[must_use]
    pub fn return_type(&self) -> EvalType {
        use BuiltinFunction as F;
        match self {
            F::StringIsNull
            | F::Length
            | F::BitLength
            | F::CharLength
            | F::CharLengthUtf8
            | F::Ascii
            | F::Ord
            | F::Locate
            | F::LocateUtf8
            | F::Instr
            | F::InstrUtf8
            | F::FindInSet
            | F::Strcmp => EvalType::Int,
            _ => EvalType::String,
        }
    }

    /// Returns whether the function has a batch evaluator.
    #[must_use]
    pub fn is_vectorized(&self) -> bool {
        true
    }

    /// Evaluates `func` (whose kind is `self`) over `input` into `out`.
    ///
    /// `out` has already been reset to the result type.
    pub(crate) fn eval(
        &self,
        func: &ScalarFunction,
        ctx: &EvalContext,
        input: &Chunk,
        out: &mut Column,
    ) -> Result<()> {
        use BuiltinFunction as F;
        match self {
            F::Lower | F::Upper => case::eval_binary_case(func, ctx, input, out),
            F::LowerUtf8 => case::eval_lower_utf8(func, ctx, input, out),
            F::UpperUtf8 => case::eval_upper_utf8(func, ctx, input, out),
            F::Reverse => case::eval_reverse(func, ctx, input, out),
            F::ReverseUtf8 => case::eval_reverse_utf8(func, ctx, input, out),
            F::Repeat => concat::eval_repeat(func, ctx, input, out),
            F::Space => concat::eval_space(func, ctx, input, out),
            F::Concat => concat::eval_concat(func, ctx, input, out),
            F::ConcatWs => concat::eval_concat_ws(func, ctx, input, out),
            F::Replace => concat::eval_replace(func, ctx, input, out),
            F::ExportSet => concat::eval_export_set(func, ctx, input, out),
            F::MakeSet => concat::eval_make_set(func, ctx, input, out),
            F::Elt => concat::eval_elt(func, ctx, input, out),
            F::Left => substring::eval_left(func, ctx, input, out),
            F::Right => substring::eval_right(func, ctx, input, out),
            F::LeftUtf8 => substring::eval_left_utf8(func, ctx, input, out),
            F::RightUtf8 => substring::eval_right_utf8(func, ctx, input, out),
            F::Substring => substring::eval_substring(func, ctx, input, out),
            F::SubstringUtf8 => substring::eval_substring_utf8(func, ctx, input, out),
            F::SubstringIndex => substring::eval_substring_index(func, ctx, input, out),
            F::Insert => substring::eval_insert(func, ctx, input, out),
            F::InsertUtf8 => substring::eval_insert_utf8(func, ctx, input, out),
            F::Lpad => pad::eval_pad(func, ctx, input, out, pad::PadMode::LeftBytes),
            F::Rpad => pad::eval_pad(func, ctx, input, out, pad::PadMode::RightBytes),
            F::LpadUtf8 => pad::eval_pad(func, ctx, input, out, pad::PadMode::LeftChars),
            F::RpadUtf8 => pad::eval_pad(func, ctx, input, out, pad::PadMode::RightChars),
            F::LTrim => trim::eval_ltrim(func, ctx, input, out),
            F::RTrim => trim::eval_rtrim(func, ctx, input, out),
            F::Trim => trim::eval_trim(func, ctx, input, out),
            F::Quote => encode::eval_quote(func, ctx, input, out),
            F::HexStr => encode::eval_hex_str(func, ctx, input, out),
            F::HexInt => encode::eval_hex_int(func, ctx, input, out),
            F::Unhex => encode::eval_unhex(func, ctx, input, out),
            F::Bin => encode::eval_bin(func, ctx, input, out),
            F::OctInt => encode::eval_oct_int(func, ctx, input, out),
            F::OctString => encode::eval_oct_string(func, ctx, input, out),
            F::ToBase64 => encode::eval_to_base64(func, ctx, input, out),
            F::FromBase64 => encode::eval_from_base64(func, ctx, input, out),
            F::Char => encode::eval_char(func, ctx, input, out),
            F::Format => format::eval_format(func, ctx, input, out),
            F::Translate => translate::eval_translate(func, ctx, input, out, false),
            F::TranslateUtf8 => translate::eval_translate(func, ctx, input, out, true),
            F::StringIsNull => length::eval_is_null(func, ctx, input, out),
            F::Length => length::eval_length(func, ctx, input, out),
            F::BitLength => length::eval_bit_length(func, ctx, input, out),
            F::CharLength => length::eval_length(func, ctx, input, out),
            F::CharLengthUtf8 => length::eval_char_length_utf8(func, ctx, input, out),
            F::Ascii => length::eval_ascii(func, ctx, input, out),
            F::Ord => length::eval_ord(func, ctx, input, out),
            F::Strcmp => length::eval_strcmp(func, ctx, input, out),
            F::Locate => search::eval_locate(func, ctx, input, out),
            F::LocateUtf8 => search::eval_locate_utf8(func, ctx, input, out),
            F::Instr => search::eval_instr(func, ctx, input, out),
            F::InstrUtf8 => search::eval_instr_utf8(func, ctx, input, out),
            F::FindInSet => search::eval_find_in_set(func, ctx, input, out),
        }
    }
}

impl std::fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Applies a byte-string transformation to every non-null row of argument 0.
pub(super) fn map_string<F>(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mut op: F,
) -> Result<()>
where
    F: FnMut(&[u8], &mut Vec<u8>),
{
    let arg = func.eval_arg(ctx, 0, input)?;
    let mut buf = Vec::new();
    for i in 0..input.num_rows() {
        if arg.is_null(i) {
            out.append_null();
            continue;
        }
        buf.clear();
        op(arg.get_bytes(i), &mut buf);
        out.append_bytes(&buf);
    }
    Ok(())
}

/// Computes an integer for every row of argument 0, then takes its nulls.
pub(super) fn map_string_to_int<F>(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
    mut op: F,
) -> Result<()>
where
    F: FnMut(&[u8]) -> i64,
{
    let arg = func.eval_arg(ctx, 0, input)?;
    out.reserve(input.num_rows());
    for i in 0..input.num_rows() {
        // Null rows read as empty strings; the merge below masks them.
        out.append_i64(op(arg.get_bytes(i)));
    }
    out.merge_nulls(&[&*arg]);
    Ok(())
}

/// Saturating conversion of a byte length for guard arithmetic.
pub(super) fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Clamps an SQL integer into a usable length; negatives become zero.
pub(super) fn clamp_len(v: i64) -> usize {
    usize::try_from(v.max(0)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_counts() {
        let sig = BuiltinFunction::Trim.signature();
        assert!(sig.accepts_count(1));
        assert!(sig.accepts_count(3));
        assert!(!sig.accepts_count(4));
        assert_eq!(sig.describe_count(), "1 to 3");

        let sig = BuiltinFunction::Concat.signature();
        assert!(!sig.accepts_count(0));
        assert!(sig.accepts_count(9));
        assert_eq!(sig.arg_type(8), Some(ArgType::String));
        assert_eq!(sig.describe_count(), "at least 1");
    }

    #[test]
    fn test_arg_types() {
        let sig = BuiltinFunction::ExportSet.signature();
        assert_eq!(sig.arg_type(0), Some(ArgType::Int));
        assert_eq!(sig.arg_type(3), Some(ArgType::String));
        assert_eq!(sig.arg_type(4), Some(ArgType::Int));
        assert_eq!(sig.arg_type(5), None);
        assert!(ArgType::Numeric.accepts(EvalType::Real));
        assert!(!ArgType::Numeric.accepts(EvalType::String));
    }

    #[test]
    fn test_return_types() {
        assert_eq!(BuiltinFunction::Locate.return_type(), EvalType::Int);
        assert_eq!(BuiltinFunction::Format.return_type(), EvalType::String);
        assert_eq!(BuiltinFunction::LpadUtf8.name(), "lpad");
    }
}
