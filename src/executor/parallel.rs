//! Parallel projection over independent chunks.
//!
//! Each rayon worker owns its evaluation contexts; nothing inside the core
//! is shared between threads. Warnings are collected here, outside the
//! core, behind a mutex.

use parking_lot::Mutex;
use rayon::prelude::*;

use super::Projection;
use crate::chunk::Chunk;
use crate::context::{EvalConfig, EvalContext, EvalWarning};
use crate::error::{Result, VexprError};
use crate::expression::Expression;

/// Result of a parallel run.
#[derive(Debug)]
pub struct ParallelOutput {
    /// Output chunks, in input order.
    pub chunks: Vec<Chunk>,
    /// Warnings tagged with the index of the chunk that raised them,
    /// ordered by chunk index and, within a chunk, by emission.
    pub warnings: Vec<(usize, EvalWarning)>,
}

impl ParallelOutput {
    /// Total number of output rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.chunks.iter().map(Chunk::num_rows).sum()
    }
}

/// Runs a [`Projection`] over many chunks on the rayon thread pool.
#[derive(Debug, Clone)]
pub struct ParallelProjection {
    projection: Projection,
    config: EvalConfig,
}

impl ParallelProjection {
    /// Creates a parallel projection of `exprs` under `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` does not validate.
    pub fn new(exprs: Vec<Expression>, config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(ParallelProjection {
            projection: Projection::new(exprs),
            config,
        })
    }

    /// Returns the session configuration given to every worker context.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluates every chunk independently.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any chunk (a fatal condition, or
    /// a packet overflow in strict mode); remaining chunks are abandoned.
    pub fn execute(&self, chunks: &[Chunk]) -> Result<ParallelOutput> {
        let warnings = Mutex::new(Vec::new());

        let results: Result<Vec<Chunk>> = chunks
            .par_iter()
            .enumerate()
            .map_init(
                || EvalContext::new(self.config.clone()),
                |ctx, (index, chunk)| {
                    let ctx = ctx
                        .as_ref()
                        .map_err(|e| VexprError::InvalidConfig(e.to_string()))?;
                    let result = self.projection.execute(ctx, chunk);
                    let raised = ctx.diagnostics().take();
                    if !raised.is_empty() {
                        warnings
                            .lock()
                            .extend(raised.into_iter().map(|w| (index, w)));
                    }
                    result
                },
            )
            .collect();

        let chunks = results?;
        let mut warnings = warnings.into_inner();
        // Stable: per-chunk emission order survives.
        warnings.sort_by_key(|(index, _)| *index);

        tracing::debug!(
            chunks = chunks.len(),
            rows = chunks.iter().map(Chunk::num_rows).sum::<usize>(),
            warnings = warnings.len(),
            "parallel projection complete"
        );
        Ok(ParallelOutput { chunks, warnings })
    }

    /// Splits `input` into chunks of the configured batch size and evaluates
    /// them in parallel.
    ///
    /// # Errors
    ///
    /// See [`ParallelProjection::execute`].
    pub fn execute_split(&self, input: &Chunk) -> Result<ParallelOutput> {
        self.execute(&input.split(self.config.batch_size))
    }
}
