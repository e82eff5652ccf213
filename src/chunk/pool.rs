//! Scratch column pool.
//!
//! Evaluating an expression tree needs one temporary column per operand.
//! The pool keeps released columns around so the next batch reuses their
//! storage instead of allocating again.
//!
//! A pool belongs to one evaluation context on one thread. It uses `RefCell`
//! and `Cell` internally and is therefore neither `Sync` nor meant to be
//! shared; concurrent pipelines give every worker its own context.
//!
//! # Example
//!
//! ```
//! use vexpr::chunk::ColumnPool;
//! use vexpr::types::EvalType;
//!
//! let pool = ColumnPool::new();
//! {
//!     let mut col = pool.lease(EvalType::Int);
//!     col.append_i64(1);
//! } // returned to the pool here
//! assert_eq!(pool.stats().idle, 1);
//! ```

use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};

use super::column::Column;
use crate::types::EvalType;

/// Pool of reusable scratch columns.
#[derive(Debug, Default)]
pub struct ColumnPool {
    /// Idle columns ready to be leased.
    idle: RefCell<Vec<Column>>,
    /// Total number of leases handed out.
    leases: Cell<u64>,
    /// Leases that had to allocate a new column.
    allocations: Cell<u64>,
    /// Leases currently alive.
    outstanding: Cell<usize>,
}

impl ColumnPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Leases a zero-length column of the given type.
    ///
    /// The column goes back to the pool when the returned guard drops, on
    /// every exit path.
    pub fn lease(&self, eval_type: EvalType) -> ColumnLease<'_> {
        self.leases.set(self.leases.get() + 1);
        self.outstanding.set(self.outstanding.get() + 1);

        let column = match self.idle.borrow_mut().pop() {
            Some(mut column) => {
                column.reset(eval_type);
                column
            }
            None => {
                self.allocations.set(self.allocations.get() + 1);
                Column::new(eval_type)
            }
        };

        ColumnLease {
            pool: self,
            column: Some(column),
        }
    }

    /// Returns a column to the idle set.
    fn release(&self, mut column: Column) {
        let eval_type = column.eval_type();
        column.reset(eval_type);
        self.idle.borrow_mut().push(column);
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
    }

    /// Returns pool statistics.
    #[must_use]
    pub fn stats(&self) -> ColumnPoolStats {
        let leases = self.leases.get();
        let allocations = self.allocations.get();
        ColumnPoolStats {
            leases,
            allocations,
            reuses: leases - allocations,
            idle: self.idle.borrow().len(),
            outstanding: self.outstanding.get(),
        }
    }

    /// Drops every idle column and resets the counters.
    pub fn clear(&self) {
        self.idle.borrow_mut().clear();
        self.leases.set(0);
        self.allocations.set(0);
    }
}

/// RAII guard for a leased column.
///
/// Dereferences to [`Column`]. Returns the column to its pool when dropped.
#[derive(Debug)]
pub struct ColumnLease<'a> {
    pool: &'a ColumnPool,
    column: Option<Column>,
}

impl ColumnLease<'_> {
    /// Takes the column out of the pool's custody.
    ///
    /// The column is not returned to the pool; use this when a scratch
    /// result becomes part of an output chunk.
    #[must_use]
    pub fn detach(mut self) -> Column {
        self.pool
            .outstanding
            .set(self.pool.outstanding.get().saturating_sub(1));
        self.column.take().unwrap_or_else(|| Column::new(EvalType::Int))
    }
}

impl Deref for ColumnLease<'_> {
    type Target = Column;

    fn deref(&self) -> &Column {
        // Only `detach` and `drop` empty the slot, and both consume the guard.
        match &self.column {
            Some(column) => column,
            None => unreachable!("column lease used after release"),
        }
    }
}

impl DerefMut for ColumnLease<'_> {
    fn deref_mut(&mut self) -> &mut Column {
        match &mut self.column {
            Some(column) => column,
            None => unreachable!("column lease used after release"),
        }
    }
}

impl Drop for ColumnLease<'_> {
    fn drop(&mut self) {
        if let Some(column) = self.column.take() {
            self.pool.release(column);
        }
    }
}

/// Statistics about pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPoolStats {
    /// Total number of leases handed out.
    pub leases: u64,
    /// Leases that allocated a new column.
    pub allocations: u64,
    /// Leases served from the idle set.
    pub reuses: u64,
    /// Columns currently idle in the pool.
    pub idle: usize,
    /// Leases currently alive.
    pub outstanding: usize,
}

impl ColumnPoolStats {
    /// Fraction of leases served from the idle set (0.0 to 1.0).
    ///
    /// Returns `None` if nothing has been leased yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reuse_rate(&self) -> Option<f64> {
        if self.leases == 0 {
            None
        } else {
            Some(self.reuses as f64 / self.leases as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_release_reuse() {
        let pool = ColumnPool::new();
        {
            let mut col = pool.lease(EvalType::String);
            col.append_str("hello");
            assert_eq!(pool.stats().outstanding, 1);
        }
        let stats = pool.stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.idle, 1);

        let col = pool.lease(EvalType::Int);
        assert!(col.is_empty());
        assert_eq!(col.eval_type(), EvalType::Int);
        assert_eq!(col.null_count(), 0);
        assert_eq!(pool.stats().reuses, 1);
        assert_eq!(pool.stats().allocations, 1);
    }

    #[test]
    fn test_nested_leases_allocate() {
        let pool = ColumnPool::new();
        let a = pool.lease(EvalType::Int);
        let b = pool.lease(EvalType::Int);
        assert_eq!(pool.stats().allocations, 2);
        drop(a);
        drop(b);
        assert_eq!(pool.stats().idle, 2);
    }

    #[test]
    fn test_release_on_error_path() {
        fn failing(pool: &ColumnPool) -> Result<(), ()> {
            let mut col = pool.lease(EvalType::Int);
            col.append_i64(1);
            Err(())
        }

        let pool = ColumnPool::new();
        assert!(failing(&pool).is_err());
        assert_eq!(pool.stats().outstanding, 0);
        assert_eq!(pool.stats().idle, 1);
    }

    #[test]
    fn test_detach() {
        let pool = ColumnPool::new();
        let mut col = pool.lease(EvalType::Int);
        col.append_i64(9);
        let owned = col.detach();
        assert_eq!(owned.get_i64(0), 9);
        let stats = pool.stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.idle, 0);
    }

    #[test]
    fn test_reuse_rate() {
        let pool = ColumnPool::new();
        assert_eq!(pool.stats().reuse_rate(), None);
        drop(pool.lease(EvalType::Int));
        drop(pool.lease(EvalType::Int));
        assert_eq!(pool.stats().reuse_rate(), Some(0.5));
    }
}
