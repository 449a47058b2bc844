//! In-process note repository.
//!
//! Used as the storage fake in tests and for throwaway sessions. Ordering and
//! filter semantics match the SQLite implementation.

use crate::model::note::{NewNote, Note, NoteId, Page, PageRequest, Tag};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    next_seq: u64,
    rows: HashMap<NoteId, StoredNote>,
}

#[derive(Debug, Clone)]
struct StoredNote {
    seq: u64,
    note: Note,
}

/// `Mutex`-guarded map keyed by note id.
#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes.
    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| RepoError::LockPoisoned)
    }

    fn page_where(
        &self,
        request: &PageRequest,
        keep: impl Fn(&Note) -> bool,
    ) -> RepoResult<Page<Note>> {
        let state = self.lock()?;
        let mut matching: Vec<&StoredNote> =
            state.rows.values().filter(|row| keep(&row.note)).collect();
        matching.sort_by(|left, right| {
            right
                .note
                .created_at
                .cmp(&left.note.created_at)
                .then(right.seq.cmp(&left.seq))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(request.size() as usize)
            .map(|row| row.note.clone())
            .collect();
        Ok(Page::new(items, request, total))
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn save_new(&self, note: &NewNote) -> RepoResult<Note> {
        note.validate()?;

        let mut state = self.lock()?;
        let id = Uuid::new_v4();
        let seq = state.next_seq;
        state.next_seq += 1;
        let stored = note.clone().into_note(id);
        state.rows.insert(
            id,
            StoredNote {
                seq,
                note: stored.clone(),
            },
        );
        Ok(stored)
    }

    fn save(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let mut state = self.lock()?;
        let row = state
            .rows
            .get_mut(&note.id)
            .ok_or(RepoError::NotFound(note.id))?;
        row.note.title = note.title.clone();
        row.note.text = note.text.clone();
        row.note.tags = note.tags.clone();
        Ok(())
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        Ok(self.lock()?.rows.get(&id).map(|row| row.note.clone()))
    }

    fn exists_by_id(&self, id: NoteId) -> RepoResult<bool> {
        Ok(self.lock()?.rows.contains_key(&id))
    }

    fn delete_by_id(&self, id: NoteId) -> RepoResult<()> {
        self.lock()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }

    fn find_all_order_by_created_desc(&self, request: &PageRequest) -> RepoResult<Page<Note>> {
        self.page_where(request, |_| true)
    }

    fn find_by_tag_order_by_created_desc(
        &self,
        tag: Tag,
        request: &PageRequest,
    ) -> RepoResult<Page<Note>> {
        self.page_where(request, |note| note.tags.contains(&tag))
    }
}
