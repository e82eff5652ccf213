//! Executor module for expression evaluation over chunks.
//!
//! [`Projection`] evaluates a list of expressions over one chunk on the
//! calling thread, choosing the vectorized path or the row-at-a-time
//! fallback per expression. [`ParallelProjection`] fans independent chunks
//! out over rayon, one evaluation context per worker.

mod parallel;
mod project;

pub use parallel::{ParallelOutput, ParallelProjection};
pub use project::{EvalPath, Projection};
