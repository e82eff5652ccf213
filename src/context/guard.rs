//! Packet-size guard for computed values.

use super::diagnostics::{Diagnostics, EvalWarning};
use crate::error::{Result, VexprError};

/// Outcome of checking one candidate value against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The value fits; materialize it.
    Normal,
    /// The value is too large; the row becomes NULL.
    Exceeded,
}

/// Enforces the maximum byte size of a single computed value.
///
/// State is per value: every check starts from `Normal`, and the only thing
/// carried between checks is the budget itself.
#[derive(Debug, Clone, Copy)]
pub struct PacketGuard {
    budget: u64,
    strict: bool,
}

impl PacketGuard {
    /// Creates a guard.
    #[must_use]
    pub fn new(budget: u64, strict: bool) -> Self {
        PacketGuard { budget, strict }
    }

    /// Returns the budget in bytes.
    #[must_use]
    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Returns whether overflow is escalated to an error.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Classifies a projected output length.
    #[must_use]
    pub fn check(&self, projected: u64) -> GuardState {
        if projected > self.budget {
            GuardState::Exceeded
        } else {
            GuardState::Normal
        }
    }

    /// Checks a projected output length and applies the overflow policy.
    ///
    /// On overflow, records a warning and returns `Exceeded` in non-strict
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns `PacketOverflow` on overflow in strict mode.
    pub fn admit(
        &self,
        function: &'static str,
        projected: u64,
        diagnostics: &Diagnostics,
    ) -> Result<GuardState> {
        match self.check(projected) {
            GuardState::Normal => Ok(GuardState::Normal),
            GuardState::Exceeded if self.strict => Err(VexprError::PacketOverflow {
                function,
                budget: self.budget,
            }),
            GuardState::Exceeded => {
                diagnostics.push(EvalWarning::PacketOverflow {
                    function,
                    budget: self.budget,
                });
                Ok(GuardState::Exceeded)
            }
        }
    }
}
