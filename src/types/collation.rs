//! String collations used by comparison and search functions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Collation of a string operand.
///
/// The utf8 collations use PAD SPACE semantics: trailing spaces are ignored
/// when two strings are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Collation {
    /// Raw byte comparison.
    Binary,
    /// Code-point comparison, case-sensitive.
    #[default]
    Utf8Mb4Bin,
    /// Case-insensitive comparison.
    Utf8Mb4GeneralCi,
}

impl Collation {
    /// Returns the collation name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Collation::Binary => "binary",
            Collation::Utf8Mb4Bin => "utf8mb4_bin",
            Collation::Utf8Mb4GeneralCi => "utf8mb4_general_ci",
        }
    }

    /// Looks up a collation by name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Collation::Binary,
            Collation::Utf8Mb4Bin,
            Collation::Utf8Mb4GeneralCi,
        ]
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Returns whether comparisons ignore letter case.
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, Collation::Utf8Mb4GeneralCi)
    }

    /// Compares two strings under this collation.
    #[must_use]
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            Collation::Binary => a.cmp(b),
            Collation::Utf8Mb4Bin => trim_pad(a).cmp(trim_pad(b)),
            Collation::Utf8Mb4GeneralCi => {
                let a = String::from_utf8_lossy(trim_pad(a)).to_lowercase();
                let b = String::from_utf8_lossy(trim_pad(b)).to_lowercase();
                a.cmp(&b)
            }
        }
    }
}

fn trim_pad(s: &[u8]) -> &[u8] {
    let end = s.iter().rposition(|&b| b != b' ').map_or(0, |p| p + 1);
    &s[..end]
}
