//! Non-fatal warnings recorded during evaluation.

use std::cell::RefCell;

use thiserror::Error;
use tracing::debug;

/// A recoverable condition attached to the statement instead of failing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalWarning {
    /// A value exceeded the packet budget and was replaced by NULL.
    #[error("Result of {function}() was larger than max_allowed_packet ({budget}) - truncated")]
    PacketOverflow { function: &'static str, budget: u64 },

    /// `FORMAT` received a locale it does not know; the default was used.
    #[error("Unknown locale: '{locale}'")]
    UnknownLocale { locale: String },

    /// `CHAR` produced bytes that are not valid in the result character set.
    #[error("Invalid {charset} character string: '{hex}'")]
    InvalidCharacterString { charset: &'static str, hex: String },
}

/// Ordered sink of warnings for one evaluation context.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: RefCell<Vec<EvalWarning>>,
}

impl Diagnostics {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn push(&self, warning: EvalWarning) {
        debug!(warning = %warning, "evaluation warning");
        self.warnings.borrow_mut().push(warning);
    }

    /// Returns a copy of the recorded warnings, oldest first.
    #[must_use]
    pub fn warnings(&self) -> Vec<EvalWarning> {
        self.warnings.borrow().clone()
    }

    /// Removes and returns the recorded warnings.
    pub fn take(&self) -> Vec<EvalWarning> {
        std::mem::take(&mut *self.warnings.borrow_mut())
    }

    /// Returns the number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    /// Returns true if no warning was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }
}
