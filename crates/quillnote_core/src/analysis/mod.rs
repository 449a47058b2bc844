//! Text analysis over note bodies.
//!
//! # Responsibility
//! - Derive request-scoped statistics from note text.
//! - Stay pure: no storage access, no logging side effects.

pub mod word_stats;
