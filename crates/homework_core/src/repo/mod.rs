//! Repository layer over the in-memory homework tree.
//!
//! # Responsibility
//! - Apply subject/task CRUD and cascade rules to the owned tree.
//! - Stay storage-agnostic; persistence is driven by the service layer.
//!
//! # Invariants
//! - Repository APIs report lookup misses as `None`/`false`.

pub mod homework_repo;
