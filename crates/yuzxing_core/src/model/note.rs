//! Note record and write inputs.
//!
//! # Responsibility
//! - Define the persisted `Note` shape and its export wire fields.
//! - Define `NoteDraft` (insert input) and `NotePatch` (partial update).
//! - Provide lifecycle helpers for the soft-delete state machine.
//!
//! # Invariants
//! - `deleted_at` is set iff `is_deleted` is true.
//! - `updated_at` is never earlier than `created_at`.
//! - Lifecycle fields are not part of `NotePatch`; they move only through
//!   delete/restore.

use super::folder::FolderId;
use super::tag::TagId;
use super::Timestamp;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned note identifier.
pub type NoteId = i64;

/// Soft-delete lifecycle state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Visible in lists and search.
    Active,
    /// In the trash; restorable until purged.
    Deleted,
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    /// Tag identifiers in display order.
    #[serde(default)]
    pub tags: Vec<TagId>,
    pub is_pinned: bool,
    pub is_deleted: bool,
    #[serde(
        default,
        with = "super::timestamp_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at: Option<Timestamp>,
    #[serde(with = "super::timestamp_text")]
    pub created_at: Timestamp,
    #[serde(with = "super::timestamp_text")]
    pub updated_at: Timestamp,
}

impl Note {
    pub fn state(&self) -> NoteState {
        if self.is_deleted {
            NoteState::Deleted
        } else {
            NoteState::Active
        }
    }

    /// Case-insensitive substring match over title and content.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Copies this record into an insert input, dropping the id.
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            folder_id: self.folder_id,
            tags: self.tags.clone(),
            is_pinned: self.is_pinned,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Validation errors for note write inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `is_deleted` is true but no `deleted_at` was given.
    MissingDeletedAt,
    /// `deleted_at` was given for an active note.
    UnexpectedDeletedAt,
    /// `updated_at` precedes `created_at`.
    UpdatedBeforeCreated,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDeletedAt => write!(f, "deleted note must carry deletedAt"),
            Self::UnexpectedDeletedAt => write!(f, "active note must not carry deletedAt"),
            Self::UpdatedBeforeCreated => write!(f, "updatedAt must not precede createdAt"),
        }
    }
}

impl Error for NoteValidationError {}

/// Insert input: a note without an id.
///
/// Deserializes from the `notes` entries of an export document; a stray `id`
/// field is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(
        default,
        with = "super::timestamp_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at: Option<Timestamp>,
    /// Defaults to the insert time, or to an earlier `updated_at`.
    #[serde(
        default,
        with = "super::timestamp_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<Timestamp>,
    /// Stamped with the insert time when absent.
    #[serde(
        default,
        with = "super::timestamp_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<Timestamp>,
}

impl NoteDraft {
    /// Creates an active, unpinned draft without folder or tags.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn in_folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = tags;
        self
    }

    pub fn pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = is_pinned;
        self
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        match (self.is_deleted, self.deleted_at.is_some()) {
            (true, false) => return Err(NoteValidationError::MissingDeletedAt),
            (false, true) => return Err(NoteValidationError::UnexpectedDeletedAt),
            _ => {}
        }

        if let (Some(created), Some(updated)) = (self.created_at, self.updated_at) {
            if updated < created {
                return Err(NoteValidationError::UpdatedBeforeCreated);
            }
        }

        Ok(())
    }
}

/// Partial update merged over an existing note.
///
/// `None` leaves a field unchanged. `folder_id: Some(None)` clears the folder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<Option<FolderId>>,
    pub tags: Option<Vec<TagId>>,
    pub is_pinned: Option<bool>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn folder(mut self, folder_id: Option<FolderId>) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = Some(is_pinned);
        self
    }

    /// Applies this patch to `note` in place. Does not touch `updated_at`.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(folder_id) = self.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(tags) = &self.tags {
            note.tags = tags.clone();
        }
        if let Some(is_pinned) = self.is_pinned {
            note.is_pinned = is_pinned;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteDraft, NotePatch, NoteState, NoteValidationError};
    use crate::model::parse_timestamp;

    fn sample_note() -> Note {
        let ts = parse_timestamp("2026-01-05T09:00:00.000Z").unwrap();
        Note {
            id: 7,
            title: "Groceries".to_string(),
            content: "Milk, Eggs".to_string(),
            folder_id: Some(2),
            tags: vec![1, 3],
            is_pinned: false,
            is_deleted: false,
            deleted_at: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn validate_rejects_mismatched_deleted_state() {
        let mut draft = NoteDraft::new("a", "b");
        draft.is_deleted = true;
        assert_eq!(
            draft.validate().unwrap_err(),
            NoteValidationError::MissingDeletedAt
        );

        draft.is_deleted = false;
        draft.deleted_at = parse_timestamp("2026-01-05T09:00:00Z");
        assert_eq!(
            draft.validate().unwrap_err(),
            NoteValidationError::UnexpectedDeletedAt
        );
    }

    #[test]
    fn validate_rejects_updated_before_created() {
        let mut draft = NoteDraft::new("a", "b");
        draft.created_at = parse_timestamp("2026-01-05T09:00:00Z");
        draft.updated_at = parse_timestamp("2026-01-04T09:00:00Z");
        assert_eq!(
            draft.validate().unwrap_err(),
            NoteValidationError::UpdatedBeforeCreated
        );
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let original = sample_note();
        let mut patched = original.clone();
        NotePatch::default().title("X").apply_to(&mut patched);

        assert_eq!(patched.title, "X");
        assert_eq!(
            Note {
                title: original.title.clone(),
                ..patched
            },
            original
        );
    }

    #[test]
    fn patch_can_clear_folder() {
        let mut note = sample_note();
        NotePatch::default().folder(None).apply_to(&mut note);
        assert_eq!(note.folder_id, None);
    }

    #[test]
    fn search_match_is_case_insensitive() {
        let note = sample_note();
        assert!(note.contains_lowercase("egg"));
        assert!(note.contains_lowercase("grocer"));
        assert!(!note.contains_lowercase("bread"));
        assert_eq!(note.state(), NoteState::Active);
    }

    #[test]
    fn serialization_uses_camel_case_and_omits_unset_fields() {
        let mut note = sample_note();
        note.folder_id = None;
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["isPinned"], false);
        assert_eq!(json["isDeleted"], false);
        assert_eq!(json["createdAt"], "2026-01-05T09:00:00.000Z");
        assert!(json.get("folderId").is_none());
        assert!(json.get("deletedAt").is_none());

        let decoded: Note = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(decoded, note);

        let draft: NoteDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft, note.to_draft());
    }
}
