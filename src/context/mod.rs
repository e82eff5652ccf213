//! Execution context for one evaluation thread.
//!
//! An [`EvalContext`] bundles everything a function needs besides its
//! operands: the session configuration, the scratch column pool, the packet
//! guard, the warning sink and a few counters. It is passed explicitly to
//! every evaluation call; nothing here is process-wide.

mod config;
mod diagnostics;
mod guard;

pub use config::{
    EvalConfig, BASE64_LINE_WIDTH, DEFAULT_LOCALE, DEFAULT_MAX_OUTPUT_BYTES, FORMAT_MAX_DECIMALS,
};
pub use diagnostics::{Diagnostics, EvalWarning};
pub use guard::{GuardState, PacketGuard};

use std::cell::Cell;

use crate::chunk::{ColumnLease, ColumnPool};
use crate::error::Result;
use crate::format::Locale;
use crate::types::EvalType;

/// Counters collected while evaluating.
#[derive(Debug, Default)]
pub struct EvalStats {
    translate_maps_built: Cell<u64>,
    row_fallback_evaluations: Cell<u64>,
}

impl EvalStats {
    /// Number of `TRANSLATE` mapping tables built.
    #[must_use]
    pub fn translate_maps_built(&self) -> u64 {
        self.translate_maps_built.get()
    }

    /// Number of rows evaluated through the row-at-a-time fallback.
    #[must_use]
    pub fn row_fallback_evaluations(&self) -> u64 {
        self.row_fallback_evaluations.get()
    }

    pub(crate) fn record_translate_map(&self) {
        self.translate_maps_built
            .set(self.translate_maps_built.get() + 1);
    }

    pub(crate) fn record_row_fallback(&self, rows: usize) {
        self.row_fallback_evaluations
            .set(self.row_fallback_evaluations.get() + rows as u64);
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.translate_maps_built.set(0);
        self.row_fallback_evaluations.set(0);
    }
}

/// Per-thread evaluation context. Not `Sync`.
#[derive(Debug)]
pub struct EvalContext {
    config: EvalConfig,
    default_locale: Locale,
    pool: ColumnPool,
    guard: PacketGuard,
    diagnostics: Diagnostics,
    stats: EvalStats,
}

impl EvalContext {
    /// Creates a context from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        let default_locale = config.locale()?;
        let guard = PacketGuard::new(config.max_output_bytes, config.strict_mode);
        Ok(EvalContext {
            config,
            default_locale,
            pool: ColumnPool::new(),
            guard,
            diagnostics: Diagnostics::new(),
            stats: EvalStats::default(),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Returns the resolved default locale.
    #[must_use]
    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// Returns the scratch column pool.
    #[must_use]
    pub fn pool(&self) -> &ColumnPool {
        &self.pool
    }

    /// Leases a scratch column from the pool.
    pub fn lease(&self, eval_type: EvalType) -> ColumnLease<'_> {
        self.pool.lease(eval_type)
    }

    /// Returns the packet guard.
    #[must_use]
    pub fn guard(&self) -> &PacketGuard {
        &self.guard
    }

    /// Returns the warning sink.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Records a warning.
    pub fn warn(&self, warning: EvalWarning) {
        self.diagnostics.push(warning);
    }

    /// Returns a copy of the recorded warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<EvalWarning> {
        self.diagnostics.warnings()
    }

    /// Returns the counters.
    #[must_use]
    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    /// Returns whether strict mode is active.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.config.strict_mode
    }

    /// Checks a projected output length against the packet budget.
    ///
    /// Returns `Ok(true)` when the value may be materialized and `Ok(false)`
    /// when the row must become NULL (a warning has been recorded).
    ///
    /// # Errors
    ///
    /// Returns `PacketOverflow` on overflow in strict mode.
    pub fn admit_output(&self, function: &'static str, projected: u64) -> Result<bool> {
        let state = self.guard.admit(function, projected, &self.diagnostics)?;
        Ok(state == GuardState::Normal)
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        let config = EvalConfig::default();
        EvalContext {
            guard: PacketGuard::new(config.max_output_bytes, config.strict_mode),
            config,
            default_locale: Locale::default(),
            pool: ColumnPool::new(),
            diagnostics: Diagnostics::new(),
            stats: EvalStats::default(),
        }
    }
}
