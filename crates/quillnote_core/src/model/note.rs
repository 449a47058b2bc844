//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its unsaved counterpart.
//! - Define the closed tag enumeration and the three-state tag update.
//! - Define paging request/response shapes shared by repo and service.
//!
//! # Invariants
//! - `id` is assigned by storage on first save and never reassigned.
//! - `created_at` is stamped once at creation and never mutated.
//! - `title` and `text` are non-blank for every persisted note.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a persisted note.
pub type NoteId = Uuid;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Fixed note category set.
///
/// Wire names are upper-case and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Business,
    Personal,
    Important,
}

impl Tag {
    /// All tag values in declaration order.
    pub const ALL: [Tag; 3] = [Tag::Business, Tag::Personal, Tag::Important];

    /// Returns the wire name of this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Business => "BUSINESS",
            Self::Personal => "PERSONAL",
            Self::Important => "IMPORTANT",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag parse failure for values outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTagError(pub String);

impl Display for UnknownTagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let allowed = Tag::ALL
            .iter()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "Invalid value '{}' for field 'tags'. Allowed values are: [{allowed}]",
            self.0
        )
    }
}

impl Error for UnknownTagError {}

impl FromStr for Tag {
    type Err = UnknownTagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "BUSINESS" => Ok(Self::Business),
            "PERSONAL" => Ok(Self::Personal),
            "IMPORTANT" => Ok(Self::Important),
            other => Err(UnknownTagError(other.to_string())),
        }
    }
}

/// Tag instruction for note updates.
///
/// `Keep` and `Replace(BTreeSet::new())` are distinct: the former preserves
/// stored tags, the latter clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagUpdate {
    /// Tag set was not provided; stored tags stay untouched.
    #[default]
    Keep,
    /// Tag set was provided and replaces stored tags exactly.
    Replace(BTreeSet<Tag>),
}

impl From<Option<BTreeSet<Tag>>> for TagUpdate {
    fn from(value: Option<BTreeSet<Tag>>) -> Self {
        match value {
            Some(tags) => Self::Replace(tags),
            None => Self::Keep,
        }
    }
}

/// Validation failures for note content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    EmptyText,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::EmptyText => write!(f, "Text is required"),
        }
    }
}

impl Error for NoteValidationError {}

fn validate_content(title: &str, text: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if text.trim().is_empty() {
        return Err(NoteValidationError::EmptyText);
    }
    Ok(())
}

/// Note that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub tags: BTreeSet<Tag>,
}

impl NewNote {
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_content(&self.title, &self.text)
    }

    /// Attaches a storage-assigned id.
    pub fn into_note(self, id: NoteId) -> Note {
        Note {
            id,
            title: self.title,
            text: self.text,
            created_at: self.created_at,
            tags: self.tags,
        }
    }
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
    pub tags: BTreeSet<Tag>,
}

impl Note {
    /// Checks content invariants required before persistence.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_content(&self.title, &self.text)
    }

    /// Returns the list projection of this note.
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            title: self.title.clone(),
            created_at: self.created_at,
        }
    }
}

/// List projection; text and tags are excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub created_at: i64,
}

/// Zero-based offset paging request.
///
/// Only `PageRequest::new` builds one, so `size` is always normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Builds a request with a normalized page size.
    ///
    /// `0` falls back to the default size and oversized values are clamped.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: normalize_page_size(Some(size)),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Normalizes page size according to listing contract.
pub fn normalize_page_size(size: Option<u32>) -> u32 {
    match size {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(value) if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        Some(value) => value,
    }
}

/// One slice of an ordered collection plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(u64::from(request.size())),
        }
    }

    /// Converts items while keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_page_size, NewNote, NoteValidationError, Page, PageRequest, Tag, TagUpdate,
    };
    use std::collections::BTreeSet;

    #[test]
    fn tag_parse_is_case_sensitive() {
        assert_eq!("BUSINESS".parse::<Tag>().unwrap(), Tag::Business);
        let err = "business".parse::<Tag>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'business' for field 'tags'. Allowed values are: [BUSINESS, PERSONAL, IMPORTANT]"
        );
    }

    #[test]
    fn tag_serializes_to_wire_name() {
        let json = serde_json::to_string(&Tag::Important).unwrap();
        assert_eq!(json, "\"IMPORTANT\"");
    }

    #[test]
    fn blank_title_or_text_fails_validation() {
        let mut draft = NewNote {
            title: "  ".to_string(),
            text: "body".to_string(),
            created_at: 0,
            tags: BTreeSet::new(),
        };
        assert_eq!(draft.validate(), Err(NoteValidationError::EmptyTitle));

        draft.title = "title".to_string();
        draft.text = "\n".to_string();
        assert_eq!(draft.validate(), Err(NoteValidationError::EmptyText));
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(normalize_page_size(None), 10);
        assert_eq!(normalize_page_size(Some(0)), 10);
        assert_eq!(normalize_page_size(Some(3)), 3);
        assert_eq!(normalize_page_size(Some(5_000)), 100);
    }

    #[test]
    fn page_request_only_exposes_normalized_size() {
        let request = PageRequest::new(2, 0);
        assert_eq!(request.page(), 2);
        assert_eq!(request.size(), 10);
        assert_eq!(request.offset(), 20);

        let page: Page<u8> = Page::new(vec![1], &request, 1);
        assert_eq!(page.size, 10);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn tag_update_from_optional_set() {
        assert_eq!(TagUpdate::from(None), TagUpdate::Keep);
        assert_eq!(
            TagUpdate::from(Some(BTreeSet::new())),
            TagUpdate::Replace(BTreeSet::new())
        );
    }

    #[test]
    fn page_counts_total_pages_with_remainder() {
        let page = Page::new(vec![1, 2, 3], &PageRequest::new(0, 3), 5);
        assert_eq!(page.total_pages, 2);

        let empty: Page<u8> = Page::new(Vec::new(), &PageRequest::new(0, 3), 0);
        assert_eq!(empty.total_pages, 0);
    }
}
