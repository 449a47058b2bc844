//! Core domain logic for QuillNote.
//! This crate is the single source of truth for note invariants.

pub mod analysis;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analysis::word_stats::{word_frequencies, WordFrequencyTable};
pub use clock::{Clock, SystemClock};
pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    NewNote, Note, NoteId, NoteSummary, NoteValidationError, Page, PageRequest, Tag, TagUpdate,
    UnknownTagError,
};
pub use repo::memory_repo::InMemoryNoteRepository;
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_service::{parse_note_id, NoteService, NoteServiceError, NoteServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
