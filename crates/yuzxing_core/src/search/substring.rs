//! In-memory substring filter over loaded notes.

use crate::model::note::Note;

/// Keeps the notes whose title or content contains `query`, ignoring case.
///
/// A blank or whitespace-only query keeps every note. Otherwise `query` is
/// matched as given, surrounding whitespace included. Input order is preserved.
pub fn filter_notes(notes: Vec<Note>, query: &str) -> Vec<Note> {
    if query.trim().is_empty() {
        return notes;
    }
    let needle = query.to_lowercase();
    notes
        .into_iter()
        .filter(|note| note.contains_lowercase(&needle))
        .collect()
}
