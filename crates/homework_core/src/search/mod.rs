//! Read-side projections of the homework tree.
//!
//! # Responsibility
//! - Compute the visible subjects/tasks for a query and status filter.
//! - Compute summary counters.
//!
//! # Invariants
//! - Nothing in this module mutates the source tree.

pub mod filter;
pub mod summary;
