//! FORMAT(x, d[, locale]).

use crate::chunk::{Chunk, Column};
use crate::context::{EvalContext, EvalWarning};
use crate::error::{Result, VexprError};
use crate::expression::ScalarFunction;
use crate::format::{format_decimal, format_int, format_real, Locale};
use crate::types::EvalType;

/// Formats `x` with `d` decimals and locale grouping.
///
/// `d` is clamped to `[0, max_format_decimals]`. A NULL or unknown locale
/// records a warning and falls back to the default locale; the locale never
/// makes the row NULL.
pub(super) fn eval_format(
    func: &ScalarFunction,
    ctx: &EvalContext,
    input: &Chunk,
    out: &mut Column,
) -> Result<()> {
    let values = func.eval_arg(ctx, 0, input)?;
    let decimals = func.eval_arg(ctx, 1, input)?;
    let locales = if func.args().len() > 2 {
        Some(func.eval_arg(ctx, 2, input)?)
    } else {
        None
    };
    let nulls = Column::union_nulls(&[&*values, &*decimals]);
    let max_decimals = ctx.config().max_format_decimals.max(0);

    for i in 0..input.num_rows() {
        if nulls.is_null(i) {
            out.append_null();
            continue;
        }
        let d = usize::try_from(decimals.get_i64(i).clamp(0, max_decimals)).unwrap_or(0);
        let locale = match &locales {
            None => ctx.default_locale(),
            Some(col) => resolve_locale(ctx, col, i),
        };
        let text = match values.eval_type() {
            EvalType::Int => format_int(values.get_i64(i), d, locale),
            EvalType::Decimal => format_decimal(values.get_decimal(i), d, locale),
            EvalType::Real => format_real(values.get_f64(i), d, locale),
            EvalType::String => {
                return Err(VexprError::TypeMismatch {
                    expected: EvalType::Decimal,
                    actual: EvalType::String,
                })
            }
        };
        out.append_str(&text);
    }
    Ok(())
}

fn resolve_locale(ctx: &EvalContext, col: &Column, i: usize) -> Locale {
    if col.is_null(i) {
        ctx.warn(EvalWarning::UnknownLocale {
            locale: "NULL".into(),
        });
        return ctx.default_locale();
    }
    let name = col.get_str_lossy(i);
    Locale::from_name(&name).unwrap_or_else(|| {
        ctx.warn(EvalWarning::UnknownLocale {
            locale: name.into_owned(),
        });
        ctx.default_locale()
    })
}
