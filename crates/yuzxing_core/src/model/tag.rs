//! Tag record.
//!
//! Notes reference tags by [`TagId`] only; display data (name, color) is
//! resolved from this collection.

use super::Timestamp;
use serde::{Deserialize, Serialize};

/// Store-assigned tag identifier.
pub type TagId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
    #[serde(with = "super::timestamp_text")]
    pub created_at: Timestamp,
}

/// Input for creating a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

impl NewTag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}
