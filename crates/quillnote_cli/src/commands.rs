//! Command execution and error mapping.
//!
//! # Invariants
//! - Blank `--title`/`--text` never reach the core service.
//! - NotFound (including malformed ids) exits with code 3, validation with 2.

use crate::{Command, NoteContent};
use quillnote_core::db::DbError;
use quillnote_core::{
    parse_note_id, ConfigError, LoggingError, NoteRepository, NoteService, NoteServiceError,
    PageRequest, RepoError, Tag, TagUpdate,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXIT_FAILURE: u8 = 1;
const EXIT_VALIDATION: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

/// Failures surfaced by the CLI.
#[derive(Debug)]
pub enum CliError {
    Validation(&'static str),
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Service(NoteServiceError),
    Output(serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => EXIT_VALIDATION,
            Self::Service(NoteServiceError::NoteNotFound(_) | NoteServiceError::InvalidId(_)) => {
                EXIT_NOT_FOUND
            }
            Self::Service(NoteServiceError::Validation(_)) => EXIT_VALIDATION,
            _ => EXIT_FAILURE,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(_) => None,
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl From<NoteServiceError> for CliError {
    fn from(value: NoteServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

/// Runs one command against the service and returns its JSON rendering.
pub(crate) fn execute<R: NoteRepository>(
    command: Command,
    service: &NoteService<R>,
) -> Result<Value, CliError> {
    match command {
        Command::Create(content) => {
            let (title, text, tags) = validated(content)?;
            let tags = (!tags.is_empty()).then_some(tags);
            Ok(serde_json::to_value(service.create(title, text, tags)?)?)
        }
        Command::Update {
            id,
            content,
            clear_tags,
        } => {
            let id = parse_note_id(&id)?;
            let (title, text, tags) = validated(content)?;
            let tags = if clear_tags {
                TagUpdate::Replace(BTreeSet::new())
            } else {
                TagUpdate::from((!tags.is_empty()).then_some(tags))
            };
            Ok(serde_json::to_value(service.update(id, title, text, tags)?)?)
        }
        Command::Delete { id } => {
            let id = parse_note_id(&id)?;
            service.delete(id)?;
            Ok(json!({ "deleted": id.to_string() }))
        }
        Command::Get { id } => {
            let id = parse_note_id(&id)?;
            Ok(serde_json::to_value(service.get_by_id(id)?)?)
        }
        Command::List { page, size, tag } => {
            let page = service.list(PageRequest::new(page, size), tag)?;
            Ok(serde_json::to_value(page)?)
        }
        Command::Stats { id } => {
            let id = parse_note_id(&id)?;
            Ok(serde_json::to_value(service.word_statistics(id)?)?)
        }
    }
}

fn validated(content: NoteContent) -> Result<(String, String, BTreeSet<Tag>), CliError> {
    if content.title.trim().is_empty() {
        return Err(CliError::Validation("Title is required"));
    }
    if content.text.trim().is_empty() {
        return Err(CliError::Validation("Text is required"));
    }
    Ok((content.title, content.text, content.tags.into_iter().collect()))
}
