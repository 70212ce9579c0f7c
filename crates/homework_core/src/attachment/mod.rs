//! Image attachment handling.
//!
//! # Responsibility
//! - Turn attachment files into embeddable data-URL strings.
//! - Keep an editable working copy of a task's images during an edit.
//!
//! # Invariants
//! - Encoding is all-or-nothing: one failed read fails the whole batch.
//! - Edits never touch the committed task until confirmed.

pub mod edit;
pub mod encode;
