//! Local document store for the YuzXing notes app.
//!
//! Holds notes, folders and tags in one per-device SQLite database, with a
//! trash lifecycle for notes and whole-database import/export.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{StoreConfig, StoreLocation, DEFAULT_DB_FILE_NAME, DEFAULT_UNTITLED_LABEL};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::folder::{Folder, FolderId, NewFolder};
pub use model::note::{Note, NoteDraft, NoteId, NotePatch, NoteState, NoteValidationError};
pub use model::snapshot::{ExportSnapshot, RestoreSummary};
pub use model::tag::{NewTag, Tag, TagId};
pub use model::Timestamp;
pub use repo::{RecordRef, RepoError, RepoResult};
pub use service::import::TextFile;
pub use service::store::{NoteFilter, NotesStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
