//! Whole-database export and backup restore.
//!
//! # Responsibility
//! - Produce the full-fidelity JSON snapshot (trash included).
//! - Produce the active-only sync payload.
//! - Restore a snapshot into a store with id remapping.
//!
//! # Invariants
//! - Restore runs in one transaction; a bad document changes nothing.
//! - Restored notes keep their lifecycle flags and timestamps.
//! - References to folders/tags absent from the snapshot are dropped, not
//!   rejected.

use super::store::{NotesStore, StoreResult};
use crate::model::folder::{FolderId, NewFolder};
use crate::model::note::Note;
use crate::model::now;
use crate::model::snapshot::{ExportSnapshot, RestoreSummary};
use crate::model::tag::{NewTag, TagId};
use crate::repo::folder_repo::{FolderRepository, SqliteFolderRepository};
use crate::repo::note_repo::{NoteListQuery, NoteRepository, SqliteNoteRepository, StateFilter};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use log::info;
use std::collections::HashMap;

impl NotesStore {
    /// Snapshot of every note (active and trashed), folder and tag.
    pub fn export_snapshot(&self) -> StoreResult<ExportSnapshot> {
        let notes = self.query_notes(&NoteListQuery {
            state: StateFilter::All,
            ..NoteListQuery::default()
        })?;
        let snapshot = ExportSnapshot {
            notes,
            folders: self.get_all_folders()?,
            tags: self.get_all_tags()?,
            exported_at: now(),
        };
        info!(
            "event=export module=store status=ok notes={} folders={} tags={}",
            snapshot.notes.len(),
            snapshot.folders.len(),
            snapshot.tags.len()
        );
        Ok(snapshot)
    }

    /// Pretty-printed JSON of [`export_snapshot`](Self::export_snapshot).
    pub fn export_to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.export_snapshot()?)?)
    }

    /// Active notes only; the payload pushed to external sync targets.
    pub fn export_notes_to_array(&self) -> StoreResult<Vec<Note>> {
        self.get_all_notes()
    }

    /// Restores an `export_to_json` document on top of the current contents.
    ///
    /// Folders and tags receive new ids; notes are re-pointed at them.
    pub fn restore_snapshot(&self, json: &str) -> StoreResult<RestoreSummary> {
        let snapshot: ExportSnapshot = serde_json::from_str(json)?;
        self.restore_from(&snapshot)
    }

    pub fn restore_from(&self, snapshot: &ExportSnapshot) -> StoreResult<RestoreSummary> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut summary = RestoreSummary::default();

        let folder_repo = SqliteFolderRepository::try_new(&tx)?;
        let mut folder_ids: HashMap<FolderId, FolderId> = HashMap::new();
        for folder in &snapshot.folders {
            let new_id = folder_repo.insert_folder(
                &NewFolder::new(folder.name.clone(), folder.icon.clone()),
                folder.created_at,
            )?;
            folder_ids.insert(folder.id, new_id);
            summary.folders += 1;
        }

        let tag_repo = SqliteTagRepository::try_new(&tx)?;
        let mut tag_ids: HashMap<TagId, TagId> = HashMap::new();
        for tag in &snapshot.tags {
            let new_id =
                tag_repo.insert_tag(&NewTag::new(tag.name.clone(), tag.color.clone()), tag.created_at)?;
            tag_ids.insert(tag.id, new_id);
            summary.tags += 1;
        }

        let note_repo = SqliteNoteRepository::try_new(&tx)?;
        let stamped = now();
        for note in &snapshot.notes {
            let mut draft = self.prepare_draft(note.to_draft());

            draft.folder_id = match note.folder_id {
                Some(old) => match folder_ids.get(&old) {
                    Some(&new_id) => Some(new_id),
                    None => {
                        summary.dropped_references += 1;
                        None
                    }
                },
                None => None,
            };

            let mut remapped = Vec::with_capacity(note.tags.len());
            for old in &note.tags {
                match tag_ids.get(old) {
                    Some(&new_id) => remapped.push(new_id),
                    None => summary.dropped_references += 1,
                }
            }
            draft.tags = remapped;

            note_repo.insert_note(&draft, stamped)?;
            summary.notes += 1;
        }

        tx.commit()?;
        info!(
            "event=restore module=store status=ok notes={} folders={} tags={} dropped_references={}",
            summary.notes, summary.folders, summary.tags, summary.dropped_references
        );
        Ok(summary)
    }
}
