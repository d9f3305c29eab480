//! Notes store facade.
//!
//! # Responsibility
//! - Own the database connection for one device store and open it lazily.
//! - Expose note CRUD, the soft-delete lifecycle, search, folders and tags.
//! - Apply store-level write policies (untitled label, reference checks).
//!
//! # Invariants
//! - `Active -> Deleted` stamps `deleted_at`; `Deleted -> Active` clears it.
//! - Every note mutation refreshes `updated_at`.
//! - Multi-record writes run inside one transaction: they fully apply or
//!   leave the store unchanged.
//! - Note titles and contents never reach the log; ids and counts do.

use crate::config::{StoreConfig, StoreLocation};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::folder::{Folder, FolderId, NewFolder};
use crate::model::note::{Note, NoteDraft, NoteId, NotePatch, NoteValidationError};
use crate::model::now;
use crate::model::tag::{NewTag, Tag, TagId};
use crate::repo::folder_repo::{FolderRepository, SqliteFolderRepository};
use crate::repo::note_repo::{
    NoteListQuery, NoteOrder, NoteRepository, SqliteNoteRepository, StateFilter,
};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::{RecordRef, RepoError};
use crate::search::filter_notes;
use log::{debug, error, info};
use once_cell::unsync::OnceCell;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Referenced record does not exist.
    NotFound(RecordRef),
    /// A write pointed at a folder or tag that does not exist.
    InvalidReference(RecordRef),
    /// Note input failed lifecycle validation.
    Validation(NoteValidationError),
    /// Import source could not be read.
    Io(std::io::Error),
    /// Export/backup document could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// Storage engine failure, propagated unchanged.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::InvalidReference(record) => write!(f, "referenced {record} does not exist"),
            Self::Validation(err) => write!(f, "invalid note: {err}"),
            Self::Io(err) => write!(f, "import source unreadable: {err}"),
            Self::Serialization(err) => write!(f, "invalid backup document: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InvalidReference(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(record) => Self::NotFound(record),
            RepoError::InvalidReference(record) => Self::InvalidReference(record),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Filter for the notes list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub folder_id: Option<FolderId>,
    pub tag_id: Option<TagId>,
    pub pinned_only: bool,
}

/// Per-device document store for notes, folders and tags.
///
/// Each instance owns its own connection, so tests can run many independent
/// stores side by side.
pub struct NotesStore {
    config: StoreConfig,
    conn: OnceCell<Connection>,
}

impl NotesStore {
    /// Creates a store without opening the database.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            conn: OnceCell::new(),
        }
    }

    /// Opens an isolated in-memory store.
    pub fn in_memory() -> Self {
        Self::new(StoreConfig::in_memory())
    }

    /// Opens the database now. Calling it on an open store is a no-op.
    pub fn init(&self) -> StoreResult<()> {
        self.conn().map(|_| ())
    }

    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    pub(crate) fn conn(&self) -> StoreResult<&Connection> {
        let conn = self.conn.get_or_try_init(|| match &self.config.location {
            StoreLocation::File(path) => open_db(path),
            StoreLocation::InMemory => open_db_in_memory(),
        })?;
        Ok(conn)
    }

    /// Replaces an empty or whitespace-only title with the untitled label.
    pub(crate) fn normalize_title(&self, title: &str) -> Option<String> {
        if title.trim().is_empty() {
            Some(self.config.untitled_label.clone())
        } else {
            None
        }
    }

    // ===== Notes =====

    /// Returns every active note in insertion order.
    pub fn get_all_notes(&self) -> StoreResult<Vec<Note>> {
        self.query_notes(&NoteListQuery::default())
    }

    /// Returns a note in either lifecycle state.
    pub fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let repo = SqliteNoteRepository::try_new(self.conn()?)?;
        Ok(repo.get_note(id)?)
    }

    /// Inserts one note and returns its assigned id.
    pub fn add_note(&self, draft: NoteDraft) -> StoreResult<NoteId> {
        let draft = self.prepare_draft(draft);
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let id = SqliteNoteRepository::try_new(&tx)?
            .insert_note(&draft, now())
            .map_err(StoreError::from)
            .inspect_err(|err| log_failure("note_add", err))?;
        tx.commit()?;
        info!("event=note_add module=store status=ok note_id={id}");
        Ok(id)
    }

    /// Shallow-merges `patch` over the stored note and refreshes `updated_at`.
    ///
    /// Fails with `NotFound` when `id` is unknown; nothing is written then.
    pub fn update_note(&self, id: NoteId, patch: NotePatch) -> StoreResult<Note> {
        let updated = self
            .mutate_note(id, |note| {
                patch.apply_to(note);
                if let Some(title) = self.normalize_title(&note.title) {
                    note.title = title;
                }
            })
            .inspect_err(|err| log_failure("note_update", err))?;
        info!("event=note_update module=store status=ok note_id={id}");
        Ok(updated)
    }

    pub fn set_pinned(&self, id: NoteId, is_pinned: bool) -> StoreResult<Note> {
        self.update_note(id, NotePatch::default().pinned(is_pinned))
    }

    /// Moves a note to the trash. Deleting a trashed note keeps its
    /// original `deleted_at`.
    pub fn delete_note(&self, id: NoteId) -> StoreResult<()> {
        let stamped = now();
        self.mutate_note(id, |note| {
            if !note.is_deleted {
                note.is_deleted = true;
                note.deleted_at = Some(stamped);
            }
        })
        .inspect_err(|err| log_failure("note_delete", err))?;
        info!("event=note_delete module=store status=ok note_id={id}");
        Ok(())
    }

    /// Returns the trash contents in insertion order.
    pub fn get_deleted_notes(&self) -> StoreResult<Vec<Note>> {
        self.query_notes(&NoteListQuery {
            state: StateFilter::Deleted,
            ..NoteListQuery::default()
        })
    }

    /// Brings a trashed note back to the active set.
    pub fn restore_note(&self, id: NoteId) -> StoreResult<()> {
        self.mutate_note(id, |note| {
            note.is_deleted = false;
            note.deleted_at = None;
        })
        .inspect_err(|err| log_failure("note_restore", err))?;
        info!("event=note_restore module=store status=ok note_id={id}");
        Ok(())
    }

    /// Irreversibly removes one note, whatever its lifecycle state.
    pub fn permanently_delete_note(&self, id: NoteId) -> StoreResult<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        SqliteNoteRepository::try_new(&tx)?
            .remove_note(id)
            .map_err(StoreError::from)
            .inspect_err(|err| log_failure("note_purge", err))?;
        tx.commit()?;
        info!("event=note_purge module=store status=ok note_id={id}");
        Ok(())
    }

    /// Purges every trashed note in one transaction; active notes are kept.
    ///
    /// Returns the number of notes removed.
    pub fn empty_trash(&self) -> StoreResult<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let removed = SqliteNoteRepository::try_new(&tx)?
            .purge_deleted()
            .map_err(StoreError::from)
            .inspect_err(|err| log_failure("trash_empty", err))?;
        tx.commit()?;
        info!("event=trash_empty module=store status=ok removed={removed}");
        Ok(removed)
    }

    pub fn trash_count(&self) -> StoreResult<usize> {
        let repo = SqliteNoteRepository::try_new(self.conn()?)?;
        Ok(repo.count_notes(StateFilter::Deleted)?)
    }

    /// Active notes whose title or content contains `query`, ignoring case.
    pub fn search_notes(&self, query: &str) -> StoreResult<Vec<Note>> {
        let hits = filter_notes(self.get_all_notes()?, query);
        debug!(
            "event=note_search module=store status=ok query_chars={} hits={}",
            query.chars().count(),
            hits.len()
        );
        Ok(hits)
    }

    /// Active notes for the list screen: pinned first, then most recently
    /// updated.
    pub fn list_notes(&self, filter: &NoteFilter) -> StoreResult<Vec<Note>> {
        self.query_notes(&NoteListQuery {
            state: StateFilter::Active,
            folder_id: filter.folder_id,
            tag_id: filter.tag_id,
            pinned_only: filter.pinned_only,
            order: NoteOrder::PinnedThenRecent,
        })
    }

    /// Inserts every draft in one transaction and returns the new ids in
    /// input order.
    ///
    /// Any failing draft rolls back the whole batch, so a failed import can
    /// be re-run without creating duplicates.
    pub fn import_notes(&self, drafts: Vec<NoteDraft>) -> StoreResult<Vec<NoteId>> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let repo = SqliteNoteRepository::try_new(&tx)?;
        let stamped = now();
        let mut ids = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let draft = self.prepare_draft(draft);
            let id = repo
                .insert_note(&draft, stamped)
                .map_err(StoreError::from)
                .inspect_err(|err| {
                    error!("event=note_import module=store status=error index={index} error={err}")
                })?;
            ids.push(id);
        }
        tx.commit()?;
        info!(
            "event=note_import module=store status=ok imported={}",
            ids.len()
        );
        Ok(ids)
    }

    // ===== Folders =====

    pub fn get_all_folders(&self) -> StoreResult<Vec<Folder>> {
        let repo = SqliteFolderRepository::try_new(self.conn()?)?;
        Ok(repo.list_folders()?)
    }

    pub fn add_folder(&self, folder: NewFolder) -> StoreResult<FolderId> {
        let repo = SqliteFolderRepository::try_new(self.conn()?)?;
        let id = repo.insert_folder(&folder, now())?;
        info!("event=folder_add module=store status=ok folder_id={id}");
        Ok(id)
    }

    /// Deletes a folder permanently; referencing notes stay, with their
    /// folder cleared.
    pub fn delete_folder(&self, id: FolderId) -> StoreResult<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let detached = SqliteFolderRepository::try_new(&tx)?
            .remove_folder(id, now())
            .map_err(StoreError::from)
            .inspect_err(|err| log_failure("folder_delete", err))?;
        tx.commit()?;
        info!("event=folder_delete module=store status=ok folder_id={id} detached_notes={detached}");
        Ok(())
    }

    // ===== Tags =====

    pub fn get_all_tags(&self) -> StoreResult<Vec<Tag>> {
        let repo = SqliteTagRepository::try_new(self.conn()?)?;
        Ok(repo.list_tags()?)
    }

    pub fn add_tag(&self, tag: NewTag) -> StoreResult<TagId> {
        let repo = SqliteTagRepository::try_new(self.conn()?)?;
        let id = repo.insert_tag(&tag, now())?;
        info!("event=tag_add module=store status=ok tag_id={id}");
        Ok(id)
    }

    /// Deletes a tag permanently and unlinks it from every note.
    pub fn delete_tag(&self, id: TagId) -> StoreResult<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let unlinked = SqliteTagRepository::try_new(&tx)?
            .remove_tag(id, now())
            .map_err(StoreError::from)
            .inspect_err(|err| log_failure("tag_delete", err))?;
        tx.commit()?;
        info!("event=tag_delete module=store status=ok tag_id={id} unlinked_notes={unlinked}");
        Ok(())
    }

    // ===== Internals =====

    pub(crate) fn query_notes(&self, query: &NoteListQuery) -> StoreResult<Vec<Note>> {
        let repo = SqliteNoteRepository::try_new(self.conn()?)?;
        Ok(repo.list_notes(query)?)
    }

    pub(crate) fn prepare_draft(&self, mut draft: NoteDraft) -> NoteDraft {
        if let Some(title) = self.normalize_title(&draft.title) {
            draft.title = title;
        }
        draft
    }

    /// Read-modify-write of one note inside a transaction.
    fn mutate_note(&self, id: NoteId, change: impl FnOnce(&mut Note)) -> StoreResult<Note> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let repo = SqliteNoteRepository::try_new(&tx)?;
        let mut note = repo
            .get_note(id)?
            .ok_or(StoreError::NotFound(RecordRef::Note(id)))?;

        change(&mut note);
        note.updated_at = now().max(note.created_at);
        repo.save_note(&note)?;
        tx.commit()?;
        Ok(note)
    }
}

fn log_failure(event: &str, err: &StoreError) {
    let error_code = match err {
        StoreError::NotFound(_) => "not_found",
        StoreError::InvalidReference(_) => "invalid_reference",
        StoreError::Validation(_) => "validation",
        StoreError::Io(_) => "io",
        StoreError::Serialization(_) => "serialization",
        StoreError::Repo(_) => "storage",
    };
    error!("event={event} module=store status=error error_code={error_code} error={err}");
}
