//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the storage operations the lifecycle service depends on.
//! - Keep SQL details inside the core persistence boundary.
//! - Own tag-link replacement with atomic semantics.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listings are ordered by `created_at DESC`, newest insert first on ties.

use crate::model::note::{NewNote, Note, NoteId, NoteValidationError, Page, PageRequest, Tag};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    text,
    created_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    /// Statement or transaction failure on an already opened database.
    Sqlite(rusqlite::Error),
    NotFound(NoteId),
    InvalidData(String),
    /// In-process storage lock was poisoned by a panicking writer.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "note storage query failed: {err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::LockPoisoned => write!(f, "note storage lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Storage contract required by the note lifecycle service.
pub trait NoteRepository {
    /// Persists a new note and returns it with a storage-assigned id.
    fn save_new(&self, note: &NewNote) -> RepoResult<Note>;
    /// Overwrites title, text and tags of an existing note.
    ///
    /// `created_at` is never rewritten.
    fn save(&self, note: &Note) -> RepoResult<()>;
    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn exists_by_id(&self, id: NoteId) -> RepoResult<bool>;
    /// Removes a note permanently.
    fn delete_by_id(&self, id: NoteId) -> RepoResult<()>;
    /// Lists all notes, newest first.
    fn find_all_order_by_created_desc(&self, request: &PageRequest) -> RepoResult<Page<Note>>;
    /// Lists notes whose tag set contains `tag`, newest first.
    fn find_by_tag_order_by_created_desc(
        &self,
        tag: Tag,
        request: &PageRequest,
    ) -> RepoResult<Page<Note>>;
}

impl<T: NoteRepository + ?Sized> NoteRepository for &T {
    fn save_new(&self, note: &NewNote) -> RepoResult<Note> {
        (**self).save_new(note)
    }

    fn save(&self, note: &Note) -> RepoResult<()> {
        (**self).save(note)
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        (**self).find_by_id(id)
    }

    fn exists_by_id(&self, id: NoteId) -> RepoResult<bool> {
        (**self).exists_by_id(id)
    }

    fn delete_by_id(&self, id: NoteId) -> RepoResult<()> {
        (**self).delete_by_id(id)
    }

    fn find_all_order_by_created_desc(&self, request: &PageRequest) -> RepoResult<Page<Note>> {
        (**self).find_all_order_by_created_desc(request)
    }

    fn find_by_tag_order_by_created_desc(
        &self,
        tag: Tag,
        request: &PageRequest,
    ) -> RepoResult<Page<Note>> {
        (**self).find_by_tag_order_by_created_desc(tag, request)
    }
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_page(&self, tag: Option<Tag>, request: &PageRequest) -> RepoResult<Page<Note>> {
        let mut filter_sql = String::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(tag) = tag {
            filter_sql.push_str(
                " WHERE EXISTS (
                    SELECT 1
                    FROM note_tags nt
                    WHERE nt.note_uuid = notes.uuid
                      AND nt.tag = ?
                )",
            );
            bind_values.push(Value::Text(tag.as_str().to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM notes{filter_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;
        let total = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{total}`")))?;

        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        bind_values.push(Value::Integer(i64::from(request.size())));
        bind_values.push(Value::Integer(offset));

        let sql = format!(
            "{NOTE_SELECT_SQL}{filter_sql}
             ORDER BY created_at DESC, seq DESC
             LIMIT ? OFFSET ?;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(self.conn, row)?);
        }

        Ok(Page::new(notes, request, total))
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn save_new(&self, note: &NewNote) -> RepoResult<Note> {
        note.validate()?;

        let id = Uuid::new_v4();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO notes (uuid, title, text, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                note.title.as_str(),
                note.text.as_str(),
                note.created_at,
            ],
        )?;
        replace_tags_in_tx(&tx, id, &note.tags)?;
        tx.commit()?;

        Ok(note.clone().into_note(id))
    }

    fn save(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                text = ?3
             WHERE uuid = ?1;",
            params![note.id.to_string(), note.title.as_str(), note.text.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }
        replace_tags_in_tx(&tx, note.id, &note.tags)?;
        tx.commit()?;

        Ok(())
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(self.conn, row)?));
        }

        Ok(None)
    }

    fn exists_by_id(&self, id: NoteId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_by_id(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_all_order_by_created_desc(&self, request: &PageRequest) -> RepoResult<Page<Note>> {
        self.query_page(None, request)
    }

    fn find_by_tag_order_by_created_desc(
        &self,
        tag: Tag,
        request: &PageRequest,
    ) -> RepoResult<Page<Note>> {
        self.query_page(Some(tag), request)
    }
}

fn replace_tags_in_tx(tx: &Transaction<'_>, id: NoteId, tags: &BTreeSet<Tag>) -> RepoResult<()> {
    let note_uuid = id.to_string();
    tx.execute(
        "DELETE FROM note_tags WHERE note_uuid = ?1;",
        [note_uuid.as_str()],
    )?;
    for tag in tags {
        tx.execute(
            "INSERT INTO note_tags (note_uuid, tag) VALUES (?1, ?2);",
            params![note_uuid.as_str(), tag.as_str()],
        )?;
    }
    Ok(())
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })?;

    let note = Note {
        id,
        title: row.get("title")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        tags: load_tags_for_note(conn, &uuid_text)?,
    };
    note.validate()?;
    Ok(note)
}

fn load_tags_for_note(conn: &Connection, note_uuid: &str) -> RepoResult<BTreeSet<Tag>> {
    let mut stmt = conn.prepare("SELECT tag FROM note_tags WHERE note_uuid = ?1;")?;
    let mut rows = stmt.query([note_uuid])?;
    let mut tags = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        let tag = value.parse::<Tag>().map_err(|_| {
            RepoError::InvalidData(format!("invalid tag `{value}` in note_tags.tag"))
        })?;
        tags.insert(tag);
    }
    Ok(tags)
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["notes", "note_tags"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::InvalidData(format!(
                "required table `{table}` is missing; open the database with `open_db`"
            )));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
