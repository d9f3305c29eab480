//! Whole-database export document.
//!
//! Wire shape:
//! `{ "notes": [...], "folders": [...], "tags": [...], "exportedAt": "<ISO-8601>" }`

use super::folder::Folder;
use super::note::Note;
use super::tag::Tag;
use super::Timestamp;
use serde::{Deserialize, Serialize};

/// Full-fidelity snapshot of the store, soft-deleted notes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub notes: Vec<Note>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(with = "super::timestamp_text")]
    pub exported_at: Timestamp,
}

/// Counts reported by a snapshot restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub folders: usize,
    pub tags: usize,
    pub notes: usize,
    /// Folder/tag references in notes that pointed outside the snapshot.
    pub dropped_references: usize,
}
