//! Domain model for subjects, tasks and the persisted homework tree.
//!
//! # Responsibility
//! - Define the canonical data structures used by repository and filter code.
//! - Keep the serde shape identical to the persisted `homeworkData` record.
//!
//! # Invariants
//! - Every subject and task is identified by a stable numeric id.
//! - A task is owned by exactly one subject.

pub mod homework;
