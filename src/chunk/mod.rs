//! Columnar storage for row batches.
//!
//! This module provides:
//! - [`Column`]: typed column buffer with a packed null bitmap
//! - [`ColumnPool`]: scoped lease/release of scratch columns
//! - [`Chunk`]: an ordered set of equal-length columns
//!
//! Arrow record batches convert to and from chunks at the pipeline boundary.

mod batch;
mod column;
mod nulls;
mod pool;

pub use batch::{Chunk, DEFAULT_BATCH_SIZE};
pub use column::Column;
pub use nulls::NullBitmap;
pub use pool::{ColumnLease, ColumnPool, ColumnPoolStats};
