//! Plain-text file import.
//!
//! Each file becomes one active note: title is the file name without its
//! extension, content is the file body, no folder and no tags.

use super::store::{NotesStore, StoreResult};
use crate::model::note::{NoteDraft, NoteId};
use std::path::Path;

const TEXT_EXTENSION: &str = ".txt";

/// One plain-text import source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    /// File name as picked by the user, extension included.
    pub name: String,
    pub body: String,
}

impl TextFile {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Reads a UTF-8 text file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, body })
    }

    /// Title derived from the file name with its extension stripped.
    ///
    /// A bare `.txt` yields an empty title.
    pub fn title(&self) -> String {
        if let Some(stem) = self.name.strip_suffix(TEXT_EXTENSION) {
            return stem.to_string();
        }
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft::new(self.title(), self.body.clone())
    }
}

impl NotesStore {
    /// Imports text files in one transaction; returns the new note ids in
    /// input order.
    pub fn import_text_files(&self, files: &[TextFile]) -> StoreResult<Vec<NoteId>> {
        self.import_notes(files.iter().map(TextFile::to_draft).collect())
    }

    /// Reads every path first, then imports them all or none.
    pub fn import_text_paths<P: AsRef<Path>>(&self, paths: &[P]) -> StoreResult<Vec<NoteId>> {
        let files = paths
            .iter()
            .map(TextFile::from_path)
            .collect::<std::io::Result<Vec<_>>>()?;
        self.import_text_files(&files)
    }
}
