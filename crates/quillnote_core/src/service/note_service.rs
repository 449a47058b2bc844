//! Note lifecycle service.
//!
//! # Responsibility
//! - Provide create/update/delete/get/list APIs over a `NoteRepository`.
//! - Delegate word statistics for a stored note to the analyzer.
//!
//! # Invariants
//! - `created_at` is stamped here, once, from the service clock.
//! - `update` never touches `id` or `created_at`.
//! - `TagUpdate::Keep` preserves stored tags; `Replace` overwrites them,
//!   including with an empty set.
//! - `delete` checks existence first, so unknown ids are an error.
//! - Listings are newest first regardless of tag filter.

use crate::analysis::word_stats::{word_frequencies, WordFrequencyTable};
use crate::clock::{Clock, SystemClock};
use crate::model::note::{
    NewNote, Note, NoteId, NoteSummary, NoteValidationError, Page, PageRequest, Tag, TagUpdate,
};
use crate::repo::note_repo::{NoteRepository, RepoError};
use log::{debug, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Caller-supplied id is not a well-formed note id.
    InvalidId(String),
    /// Title or text is blank.
    Validation(NoteValidationError),
    /// Persistence-layer failure, propagated unchanged.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "Note not found with id: {id}"),
            Self::InvalidId(raw) => write!(f, "Note not found with id: {raw} (malformed id)"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) | Self::InvalidId(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Parses a boundary id string into a `NoteId`.
pub fn parse_note_id(raw: &str) -> NoteServiceResult<NoteId> {
    Uuid::parse_str(raw.trim()).map_err(|_| NoteServiceError::InvalidId(raw.to_string()))
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service stamping notes from the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: NoteRepository, C: Clock> NoteService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Creates and persists a note; absent tags default to an empty set.
    pub fn create(
        &self,
        title: impl Into<String>,
        text: impl Into<String>,
        tags: Option<BTreeSet<Tag>>,
    ) -> NoteServiceResult<Note> {
        let draft = NewNote {
            title: title.into(),
            text: text.into(),
            created_at: self.clock.now_ms(),
            tags: tags.unwrap_or_default(),
        };
        draft.validate()?;

        let note = self.repo.save_new(&draft)?;
        info!(
            "event=note_create module=service status=ok note_id={} tag_count={}",
            note.id,
            note.tags.len()
        );
        Ok(note)
    }

    /// Replaces title and text, and tags when `tags` is `Replace`.
    pub fn update(
        &self,
        id: NoteId,
        title: impl Into<String>,
        text: impl Into<String>,
        tags: TagUpdate,
    ) -> NoteServiceResult<Note> {
        let mut note = self.get_by_id(id)?;
        note.title = title.into();
        note.text = text.into();
        let tags_replaced = matches!(tags, TagUpdate::Replace(_));
        if let TagUpdate::Replace(replacement) = tags {
            note.tags = replacement;
        }
        note.validate()?;

        self.repo.save(&note)?;
        info!(
            "event=note_update module=service status=ok note_id={} tags_replaced={} tag_count={}",
            note.id,
            tags_replaced,
            note.tags.len()
        );
        Ok(note)
    }

    /// Deletes a note permanently.
    pub fn delete(&self, id: NoteId) -> NoteServiceResult<()> {
        if !self.repo.exists_by_id(id)? {
            debug!("event=note_delete module=service status=not_found note_id={id}");
            return Err(NoteServiceError::NoteNotFound(id));
        }
        self.repo.delete_by_id(id)?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(())
    }

    pub fn get_by_id(&self, id: NoteId) -> NoteServiceResult<Note> {
        self.repo
            .find_by_id(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Lists summaries newest first, optionally restricted to one tag.
    pub fn list(
        &self,
        request: PageRequest,
        tag: Option<Tag>,
    ) -> NoteServiceResult<Page<NoteSummary>> {
        let page = match tag {
            Some(tag) => self.repo.find_by_tag_order_by_created_desc(tag, &request)?,
            None => self.repo.find_all_order_by_created_desc(&request)?,
        };
        debug!(
            "event=note_list module=service status=ok page={} size={} tag={} total={}",
            page.page,
            page.size,
            tag.map_or("none", Tag::as_str),
            page.total_elements
        );
        Ok(page.map(|note| note.summary()))
    }

    /// Computes word frequencies over the stored note text.
    pub fn word_statistics(&self, id: NoteId) -> NoteServiceResult<WordFrequencyTable> {
        let note = self.get_by_id(id)?;
        let table = word_frequencies(&note.text);
        debug!(
            "event=note_stats module=service status=ok note_id={} distinct_words={}",
            id,
            table.len()
        );
        Ok(table)
    }
}
