//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist note rows and their ordered tag links.
//! - Provide state-filtered listing for active notes and the trash.
//!
//! # Invariants
//! - Writes validate the note lifecycle fields before SQL mutations.
//! - Writes reject folder/tag references that do not exist.
//! - Tag links keep the caller's order; duplicates are dropped.

use super::{
    bool_to_int, ensure_connection_ready, int_to_bool, record_exists, text_to_timestamp,
    RecordRef, RepoError, RepoResult,
};
use crate::model::folder::FolderId;
use crate::model::format_timestamp;
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::tag::TagId;
use crate::model::Timestamp;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    folder_id,
    is_pinned,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM notes";

/// Which side of the soft-delete lifecycle a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateFilter {
    #[default]
    Active,
    Deleted,
    All,
}

/// Result ordering for note listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteOrder {
    /// Insertion order.
    #[default]
    IdAsc,
    /// Pinned notes first, then most recently updated.
    PinnedThenRecent,
}

/// Query options for listing notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    pub state: StateFilter,
    pub folder_id: Option<FolderId>,
    pub tag_id: Option<TagId>,
    pub pinned_only: bool,
    pub order: NoteOrder,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts one note and returns its assigned id.
    ///
    /// Missing draft timestamps are stamped with `now`.
    fn insert_note(&self, draft: &NoteDraft, now: Timestamp) -> RepoResult<NoteId>;
    /// Gets one note by id regardless of lifecycle state.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Overwrites every mutable column of an existing note, tag links included.
    fn save_note(&self, note: &Note) -> RepoResult<()>;
    /// Hard-deletes one note.
    fn remove_note(&self, id: NoteId) -> RepoResult<()>;
    /// Hard-deletes every soft-deleted note and returns how many were removed.
    fn purge_deleted(&self) -> RepoResult<usize>;
    fn count_notes(&self, state: StateFilter) -> RepoResult<usize>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection (or transaction).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn ensure_references(&self, folder_id: Option<FolderId>, tags: &[TagId]) -> RepoResult<()> {
        if let Some(folder_id) = folder_id {
            if !record_exists(self.conn, "folders", folder_id)? {
                return Err(RepoError::InvalidReference(RecordRef::Folder(folder_id)));
            }
        }
        for &tag_id in tags {
            if !record_exists(self.conn, "tags", tag_id)? {
                return Err(RepoError::InvalidReference(RecordRef::Tag(tag_id)));
            }
        }
        Ok(())
    }

    fn replace_tag_links(&self, note_id: NoteId, tags: &[TagId]) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM note_tags WHERE note_id = ?1;", [note_id])?;

        for (position, tag_id) in dedup_preserving_order(tags).into_iter().enumerate() {
            self.conn.execute(
                "INSERT INTO note_tags (note_id, tag_id, position) VALUES (?1, ?2, ?3);",
                params![note_id, tag_id, position as i64],
            )?;
        }
        Ok(())
    }

    fn load_tag_ids(&self, note_id: NoteId) -> RepoResult<Vec<TagId>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag_id
             FROM note_tags
             WHERE note_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([note_id])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get(0)?);
        }
        Ok(tags)
    }

    fn parse_note_row(&self, row: &Row<'_>) -> RepoResult<Note> {
        let id: NoteId = row.get("id")?;
        let deleted_at = match row.get::<_, Option<String>>("deleted_at")? {
            Some(value) => Some(text_to_timestamp(&value, "notes.deleted_at")?),
            None => None,
        };
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        Ok(Note {
            id,
            title: row.get("title")?,
            content: row.get("content")?,
            folder_id: row.get("folder_id")?,
            tags: self.load_tag_ids(id)?,
            is_pinned: int_to_bool(row.get("is_pinned")?, "notes.is_pinned")?,
            is_deleted: int_to_bool(row.get("is_deleted")?, "notes.is_deleted")?,
            deleted_at,
            created_at: text_to_timestamp(&created_at, "notes.created_at")?,
            updated_at: text_to_timestamp(&updated_at, "notes.updated_at")?,
        })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, draft: &NoteDraft, now: Timestamp) -> RepoResult<NoteId> {
        draft.validate()?;
        self.ensure_references(draft.folder_id, &draft.tags)?;

        // A draft carrying only `updated_at` is treated as created at that moment.
        let created_at = draft
            .created_at
            .unwrap_or_else(|| draft.updated_at.map_or(now, |updated| updated.min(now)));
        let updated_at = draft.updated_at.unwrap_or(created_at.max(now));

        self.conn.execute(
            "INSERT INTO notes (
                title,
                content,
                folder_id,
                is_pinned,
                is_deleted,
                deleted_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                draft.title.as_str(),
                draft.content.as_str(),
                draft.folder_id,
                bool_to_int(draft.is_pinned),
                bool_to_int(draft.is_deleted),
                draft.deleted_at.as_ref().map(format_timestamp),
                format_timestamp(&created_at),
                format_timestamp(&updated_at),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.replace_tag_links(id, &draft.tags)?;
        Ok(id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.state {
            StateFilter::Active => sql.push_str(" AND is_deleted = 0"),
            StateFilter::Deleted => sql.push_str(" AND is_deleted = 1"),
            StateFilter::All => {}
        }

        if let Some(folder_id) = query.folder_id {
            sql.push_str(" AND folder_id = ?");
            bind_values.push(Value::Integer(folder_id));
        }

        if let Some(tag_id) = query.tag_id {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM note_tags nt
                    WHERE nt.note_id = notes.id
                      AND nt.tag_id = ?
                )",
            );
            bind_values.push(Value::Integer(tag_id));
        }

        if query.pinned_only {
            sql.push_str(" AND is_pinned = 1");
        }

        match query.order {
            NoteOrder::IdAsc => sql.push_str(" ORDER BY id ASC"),
            NoteOrder::PinnedThenRecent => {
                sql.push_str(" ORDER BY is_pinned DESC, updated_at DESC, id DESC")
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(self.parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn save_note(&self, note: &Note) -> RepoResult<()> {
        note.to_draft().validate()?;
        self.ensure_references(note.folder_id, &note.tags)?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                folder_id = ?4,
                is_pinned = ?5,
                is_deleted = ?6,
                deleted_at = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                note.id,
                note.title.as_str(),
                note.content.as_str(),
                note.folder_id,
                bool_to_int(note.is_pinned),
                bool_to_int(note.is_deleted),
                note.deleted_at.as_ref().map(format_timestamp),
                format_timestamp(&note.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Note(note.id)));
        }

        self.replace_tag_links(note.id, &note.tags)
    }

    fn remove_note(&self, id: NoteId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM note_tags WHERE note_id = ?1;", [id])?;
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Note(id)));
        }
        Ok(())
    }

    fn purge_deleted(&self) -> RepoResult<usize> {
        self.conn.execute(
            "DELETE FROM note_tags
             WHERE note_id IN (SELECT id FROM notes WHERE is_deleted = 1);",
            [],
        )?;
        let removed = self
            .conn
            .execute("DELETE FROM notes WHERE is_deleted = 1;", [])?;
        Ok(removed)
    }

    fn count_notes(&self, state: StateFilter) -> RepoResult<usize> {
        let sql = match state {
            StateFilter::Active => "SELECT COUNT(*) FROM notes WHERE is_deleted = 0;",
            StateFilter::Deleted => "SELECT COUNT(*) FROM notes WHERE is_deleted = 1;",
            StateFilter::All => "SELECT COUNT(*) FROM notes;",
        };
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

fn dedup_preserving_order(tags: &[TagId]) -> Vec<TagId> {
    let mut seen = HashSet::new();
    tags.iter().copied().filter(|tag| seen.insert(*tag)).collect()
}
