//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - Tag deletion is a hard delete.
//! - Deleting a tag unlinks it from every note and refreshes their
//!   `updated_at`; notes themselves are kept.

use super::{ensure_connection_ready, text_to_timestamp, RecordRef, RepoError, RepoResult};
use crate::model::tag::{NewTag, Tag, TagId};
use crate::model::{format_timestamp, Timestamp};
use rusqlite::{params, Connection, Row};

pub trait TagRepository {
    fn insert_tag(&self, tag: &NewTag, created_at: Timestamp) -> RepoResult<TagId>;
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Removes one tag and returns how many notes lost the link.
    fn remove_tag(&self, id: TagId, now: Timestamp) -> RepoResult<usize>;
}

pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn insert_tag(&self, tag: &NewTag, created_at: Timestamp) -> RepoResult<TagId> {
        self.conn.execute(
            "INSERT INTO tags (name, color, created_at) VALUES (?1, ?2, ?3);",
            params![
                tag.name.as_str(),
                tag.color.as_str(),
                format_timestamp(&created_at)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, created_at
             FROM tags
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn remove_tag(&self, id: TagId, now: Timestamp) -> RepoResult<usize> {
        self.conn.execute(
            "UPDATE notes
             SET updated_at = MAX(created_at, ?2)
             WHERE id IN (SELECT note_id FROM note_tags WHERE tag_id = ?1);",
            params![id, format_timestamp(&now)],
        )?;
        let unlinked = self
            .conn
            .execute("DELETE FROM note_tags WHERE tag_id = ?1;", [id])?;
        let changed = self.conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Tag(id)));
        }
        Ok(unlinked)
    }
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let created_at: String = row.get("created_at")?;
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: text_to_timestamp(&created_at, "tags.created_at")?,
    })
}
