//! Folder repository contract and SQLite implementation.
//!
//! # Invariants
//! - Folder deletion is a hard delete.
//! - Deleting a folder clears `folder_id` on every referencing note in the
//!   same statement sequence and refreshes their `updated_at`; notes
//!   themselves are never removed.

use super::{ensure_connection_ready, text_to_timestamp, RecordRef, RepoError, RepoResult};
use crate::model::folder::{Folder, FolderId, NewFolder};
use crate::model::{format_timestamp, Timestamp};
use rusqlite::{params, Connection, Row};

pub trait FolderRepository {
    fn insert_folder(&self, folder: &NewFolder, created_at: Timestamp) -> RepoResult<FolderId>;
    fn list_folders(&self) -> RepoResult<Vec<Folder>>;
    /// Removes one folder and returns how many notes were detached from it.
    ///
    /// Detached notes get `updated_at = now`.
    fn remove_folder(&self, id: FolderId, now: Timestamp) -> RepoResult<usize>;
}

pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn insert_folder(&self, folder: &NewFolder, created_at: Timestamp) -> RepoResult<FolderId> {
        self.conn.execute(
            "INSERT INTO folders (name, icon, created_at) VALUES (?1, ?2, ?3);",
            params![
                folder.name.as_str(),
                folder.icon.as_str(),
                format_timestamp(&created_at)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_folders(&self) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, icon, created_at
             FROM folders
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    fn remove_folder(&self, id: FolderId, now: Timestamp) -> RepoResult<usize> {
        let detached = self.conn.execute(
            "UPDATE notes
             SET folder_id = NULL,
                 updated_at = MAX(created_at, ?2)
             WHERE folder_id = ?1;",
            params![id, format_timestamp(&now)],
        )?;
        let changed = self
            .conn
            .execute("DELETE FROM folders WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Folder(id)));
        }
        Ok(detached)
    }
}

fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    let created_at: String = row.get("created_at")?;
    Ok(Folder {
        id: row.get("id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        created_at: text_to_timestamp(&created_at, "folders.created_at")?,
    })
}
