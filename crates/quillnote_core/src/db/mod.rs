//! Note database bootstrap.
//!
//! # Responsibility
//! - Turn a path (or nothing, for in-memory) into a connection that holds the
//!   current notes schema.
//! - Report which bootstrap step failed, so a bad file and a bad migration are
//!   told apart.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A failed migration leaves `user_version` untouched.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while preparing a note database for use.
#[derive(Debug)]
pub enum DbError {
    /// SQLite could not open `target` (a file path or `:memory:`).
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// A connection setting such as `foreign_keys` could not be applied.
    Configure {
        setting: &'static str,
        source: rusqlite::Error,
    },
    ReadSchemaVersion(rusqlite::Error),
    /// Migration `version` failed; the whole batch was rolled back.
    Migrate {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer quillnote build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable code used in `db_open` log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Configure { .. } => "db_configure_failed",
            Self::ReadSchemaVersion(_) => "db_schema_version_unreadable",
            Self::Migrate { .. } => "db_migrate_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open note database `{target}`: {source}")
            }
            Self::Configure { setting, source } => {
                write!(f, "cannot apply `{setting}` to note database: {source}")
            }
            Self::ReadSchemaVersion(source) => {
                write!(f, "cannot read note schema version: {source}")
            }
            Self::Migrate { version, source } => {
                write!(f, "note schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note database uses schema {db_version}, this build supports up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Configure { source, .. }
            | Self::Migrate { source, .. }
            | Self::ReadSchemaVersion(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
