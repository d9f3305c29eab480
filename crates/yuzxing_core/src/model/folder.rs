//! Folder record.
//!
//! Folders have no soft-delete state: deletion is immediate and permanent.

use super::Timestamp;
use serde::{Deserialize, Serialize};

/// Store-assigned folder identifier.
pub type FolderId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    /// Free-form icon key chosen by the UI.
    pub icon: String,
    #[serde(with = "super::timestamp_text")]
    pub created_at: Timestamp,
}

/// Input for creating a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFolder {
    pub name: String,
    pub icon: String,
}

impl NewFolder {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}
