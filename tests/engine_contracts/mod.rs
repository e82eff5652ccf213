//! Contract tests for the evaluation engine.
//!
//! These tests verify the laws every built-in function obeys:
//! - Batch evaluation matches row-at-a-time evaluation
//! - NULL operands produce NULL, except for the documented exceptions
//! - Parallel evaluation matches sequential evaluation

pub mod support;

mod batch_row_contract;
mod null_propagation_contract;
mod parallel_contract;
