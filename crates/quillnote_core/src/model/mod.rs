//! Note domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep tag values a closed set so invalid input never reaches storage.
//!
//! # Invariants
//! - Every persisted note is identified by a stable `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
