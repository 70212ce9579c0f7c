//! Use-case services for the presentation layer.
//!
//! # Responsibility
//! - Pair the in-memory repository with its persistence handle.
//! - Run every mutation followed by a full-tree save.
//! - Own the async attachment-bearing create/edit flows.

pub mod edit_session;
pub mod homework_service;
