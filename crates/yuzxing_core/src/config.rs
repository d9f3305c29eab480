//! Store configuration.
//!
//! # Responsibility
//! - Describe where the notes database lives and the store-level write
//!   policies.
//!
//! # Invariants
//! - Building a config never touches the file system; the database is opened
//!   by the store on first use.

use std::path::{Path, PathBuf};

/// Default file name used when no explicit database path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "yuzxing.sqlite3";

/// Placeholder title written for notes saved with an empty title.
pub const DEFAULT_UNTITLED_LABEL: &str = "Untitled";

/// Backing location of the notes database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite file; parent directories are created on open.
    File(PathBuf),
    /// Private in-memory database, discarded with the store.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// Title substituted for empty or whitespace-only titles on write.
    pub untitled_label: String,
}

impl StoreConfig {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: StoreLocation::File(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
            ..Self::default()
        }
    }

    pub fn with_untitled_label(mut self, label: impl Into<String>) -> Self {
        self.untitled_label = label.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: StoreLocation::File(PathBuf::from(DEFAULT_DB_FILE_NAME)),
            untitled_label: DEFAULT_UNTITLED_LABEL.to_string(),
        }
    }
}
