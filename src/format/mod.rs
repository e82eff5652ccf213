//! Numeric formatting with locale-specific separators.
//!
//! Decimal values are rounded and grouped without ever passing through
//! floating point. Floating point values are first converted to their
//! shortest round-trip decimal representation and then take the decimal
//! path, so `FORMAT(0.15, 1)` rounds the literal `0.15` rather than the
//! binary approximation below it.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::Sign;
use serde::{Deserialize, Serialize};

/// Locales understood by `FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// English (United States).
    #[default]
    EnUs,
    /// English (United Kingdom).
    EnGb,
    /// English (Australia).
    EnAu,
    /// English (Canada).
    EnCa,
    /// German (Germany).
    DeDe,
}

impl Locale {
    const ALL: [Locale; 5] = [
        Locale::EnUs,
        Locale::EnGb,
        Locale::EnAu,
        Locale::EnCa,
        Locale::DeDe,
    ];

    /// Returns the locale name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Locale::EnUs => "en_US",
            Locale::EnGb => "en_GB",
            Locale::EnAu => "en_AU",
            Locale::EnCa => "en_CA",
            Locale::DeDe => "de_DE",
        }
    }

    /// Looks up a locale by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }

    /// Thousands separator.
    #[must_use]
    pub fn grouping_separator(&self) -> char {
        match self {
            Locale::DeDe => '.',
            _ => ',',
        }
    }

    /// Decimal mark.
    #[must_use]
    pub fn decimal_mark(&self) -> char {
        match self {
            Locale::DeDe => ',',
            _ => '.',
        }
    }
}

/// Rounds to `scale` fractional digits, half away from zero.
#[must_use]
pub fn round_half_away(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfUp)
}

/// Formats a decimal with `decimals` fractional digits and locale grouping.
#[must_use]
pub fn format_decimal(value: &BigDecimal, decimals: usize, locale: Locale) -> String {
    let scale = i64::try_from(decimals).unwrap_or(i64::MAX);
    let rounded = round_half_away(value, scale);
    let (digits, _) = rounded.as_bigint_and_exponent();

    let mut magnitude = digits.magnitude().to_string();
    if magnitude.len() <= decimals {
        let pad = decimals + 1 - magnitude.len();
        magnitude.insert_str(0, &"0".repeat(pad));
    }
    let (int_part, frac_part) = magnitude.split_at(magnitude.len() - decimals);

    let mut out = String::with_capacity(magnitude.len() + magnitude.len() / 3 + 2);
    if digits.sign() == Sign::Minus {
        out.push('-');
    }
    group_digits(int_part, locale.grouping_separator(), &mut out);
    if decimals > 0 {
        out.push(locale.decimal_mark());
        out.push_str(frac_part);
    }
    out
}

/// Formats a float with `decimals` fractional digits and locale grouping.
///
/// Non-finite values are returned as their plain text form.
#[must_use]
pub fn format_real(value: f64, decimals: usize, locale: Locale) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // Rust's `Display` for f64 is the shortest round-trip form, never
    // exponential, so it always parses back as a decimal.
    match BigDecimal::from_str(&value.to_string()) {
        Ok(decimal) => format_decimal(&decimal, decimals, locale),
        Err(_) => value.to_string(),
    }
}

/// Formats an integer with `decimals` zero fractional digits and locale
/// grouping.
#[must_use]
pub fn format_int(value: i64, decimals: usize, locale: Locale) -> String {
    format_decimal(&BigDecimal::from(value), decimals, locale)
}

fn group_digits(digits: &str, separator: char, out: &mut String) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}
