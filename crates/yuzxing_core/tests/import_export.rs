use serde_json::Value;
use yuzxing_core::model::parse_timestamp;
use yuzxing_core::{
    ExportSnapshot, NewFolder, NewTag, NoteDraft, NotesStore, RecordRef, StoreError, TextFile,
    DEFAULT_UNTITLED_LABEL,
};

fn seeded_store() -> NotesStore {
    let store = NotesStore::in_memory();
    let folder = store.add_folder(NewFolder::new("Work", "briefcase")).unwrap();
    let tag = store.add_tag(NewTag::new("urgent", "#f00")).unwrap();
    store
        .add_note(
            NoteDraft::new("Plan", "ship it")
                .in_folder(folder)
                .with_tags(vec![tag])
                .pinned(true),
        )
        .unwrap();
    let trashed = store.add_note(NoteDraft::new("Old", "stale")).unwrap();
    store.delete_note(trashed).unwrap();
    store
}

#[test]
fn import_text_files_creates_one_note_per_file() {
    let store = NotesStore::in_memory();
    let ids = store
        .import_text_files(&[TextFile::new("a.txt", "hello"), TextFile::new("b.txt", "world")])
        .unwrap();
    assert_eq!(ids.len(), 2);

    let notes = store.get_all_notes().unwrap();
    let pairs: Vec<(&str, &str)> = notes
        .iter()
        .map(|n| (n.title.as_str(), n.content.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "hello"), ("b", "world")]);
    assert!(notes.iter().all(|n| n.folder_id.is_none() && n.tags.is_empty()));
    assert!(notes.iter().all(|n| !n.is_deleted));
}

#[test]
fn import_of_bare_txt_file_name_gets_untitled_label() {
    let store = NotesStore::in_memory();
    let ids = store
        .import_text_files(&[TextFile::new(".txt", "body")])
        .unwrap();
    let note = store.get_note(ids[0]).unwrap().unwrap();
    assert_eq!(note.title, DEFAULT_UNTITLED_LABEL);
    assert_eq!(note.content, "body");
}

#[test]
fn imported_draft_with_only_updated_at_is_not_created_after_it() {
    let store = NotesStore::in_memory();
    let mut draft = NoteDraft::new("old", "from another app");
    draft.updated_at = parse_timestamp("2020-01-01T00:00:00Z");

    let ids = store.import_notes(vec![draft]).unwrap();
    let note = store.get_note(ids[0]).unwrap().unwrap();
    assert_eq!(note.updated_at, parse_timestamp("2020-01-01T00:00:00Z").unwrap());
    assert!(note.created_at <= note.updated_at);
}

#[test]
fn import_text_paths_reads_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.txt");
    std::fs::write(&path, "今天天氣很好").unwrap();

    let store = NotesStore::in_memory();
    store.import_text_paths(&[&path]).unwrap();

    let notes = store.get_all_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "journal");
    assert_eq!(notes[0].content, "今天天氣很好");
}

#[test]
fn import_text_paths_with_missing_file_imports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    std::fs::write(&good, "ok").unwrap();
    let missing = dir.path().join("missing.txt");

    let store = NotesStore::in_memory();
    let err = store.import_text_paths(&[good, missing]).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert!(store.get_all_notes().unwrap().is_empty());
}

#[test]
fn import_notes_is_all_or_nothing() {
    let store = NotesStore::in_memory();
    let err = store
        .import_notes(vec![
            NoteDraft::new("first", ""),
            NoteDraft::new("bad", "").in_folder(404),
            NoteDraft::new("third", ""),
        ])
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(RecordRef::Folder(404))));
    assert!(store.get_all_notes().unwrap().is_empty());

    let ids = store
        .import_notes(vec![NoteDraft::new("first", ""), NoteDraft::new("third", "")])
        .unwrap();
    assert_eq!(store.get_all_notes().unwrap().len(), ids.len());
}

#[test]
fn export_includes_trash_folders_and_tags() {
    let store = seeded_store();
    let json: Value = serde_json::from_str(&store.export_to_json().unwrap()).unwrap();

    let notes = json["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["title"], "Plan");
    assert_eq!(notes[0]["isPinned"], true);
    assert!(notes[0]["folderId"].is_i64());
    assert_eq!(notes[0]["tags"].as_array().unwrap().len(), 1);
    assert!(notes[0].get("deletedAt").is_none());
    assert_eq!(notes[1]["isDeleted"], true);
    assert!(notes[1]["deletedAt"].is_string());

    assert_eq!(json["folders"][0]["name"], "Work");
    assert_eq!(json["folders"][0]["icon"], "briefcase");
    assert_eq!(json["tags"][0]["color"], "#f00");
    assert!(json["exportedAt"].is_string());
}

#[test]
fn export_writes_timestamps_with_millisecond_precision() {
    let store = NotesStore::in_memory();
    let mut draft = NoteDraft::new("dated", "");
    draft.created_at = parse_timestamp("2026-02-01T00:00:00Z");
    draft.updated_at = parse_timestamp("2026-02-01T00:00:00Z");
    store.import_notes(vec![draft]).unwrap();

    let json: Value = serde_json::from_str(&store.export_to_json().unwrap()).unwrap();
    assert_eq!(json["notes"][0]["createdAt"], "2026-02-01T00:00:00.000Z");
    assert_eq!(json["notes"][0]["updatedAt"], "2026-02-01T00:00:00.000Z");

    let exported_at = json["exportedAt"].as_str().unwrap();
    let (_, fraction) = exported_at.rsplit_once('.').unwrap();
    assert_eq!(fraction.len(), "123Z".len());
    assert!(fraction.ends_with('Z'));
}

#[test]
fn export_notes_to_array_returns_active_notes_only() {
    let store = seeded_store();
    let payload = store.export_notes_to_array().unwrap();
    assert_eq!(payload.len(), 1);
    assert_eq!(payload[0].title, "Plan");
}

#[test]
fn reimporting_exported_notes_reproduces_titles_contents_and_flags() {
    let store = seeded_store();
    let snapshot: ExportSnapshot = serde_json::from_str(&store.export_to_json().unwrap()).unwrap();

    store.empty_trash().unwrap();
    for note in store.get_all_notes().unwrap() {
        store.permanently_delete_note(note.id).unwrap();
    }

    let drafts: Vec<NoteDraft> = snapshot.notes.iter().map(|n| n.to_draft()).collect();
    store.import_notes(drafts).unwrap();

    let mut reimported = store.export_snapshot().unwrap().notes;
    let mut original = snapshot.notes;
    for notes in [&mut reimported, &mut original] {
        notes.sort_by(|a, b| a.title.cmp(&b.title));
    }
    assert_eq!(reimported.len(), original.len());
    for (after, before) in reimported.iter().zip(&original) {
        assert_ne!(after.id, before.id);
        assert_eq!(after.title, before.title);
        assert_eq!(after.content, before.content);
        assert_eq!(after.is_pinned, before.is_pinned);
        assert_eq!(after.is_deleted, before.is_deleted);
        assert_eq!(after.deleted_at, before.deleted_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.updated_at, before.updated_at);
    }
}

#[test]
fn restore_snapshot_into_empty_store_remaps_references() {
    let source = seeded_store();
    let json = source.export_to_json().unwrap();

    let target = NotesStore::in_memory();
    target.add_folder(NewFolder::new("Existing", "")).unwrap();
    let summary = target.restore_snapshot(&json).unwrap();

    assert_eq!(summary.folders, 1);
    assert_eq!(summary.tags, 1);
    assert_eq!(summary.notes, 2);
    assert_eq!(summary.dropped_references, 0);

    let folders = target.get_all_folders().unwrap();
    let work = folders.iter().find(|f| f.name == "Work").unwrap();
    let tag = &target.get_all_tags().unwrap()[0];

    let active = target.get_all_notes().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].folder_id, Some(work.id));
    assert_eq!(active[0].tags, vec![tag.id]);
    assert_eq!(target.get_deleted_notes().unwrap().len(), 1);
}

#[test]
fn restore_snapshot_drops_dangling_references() {
    let json = r#"{
        "notes": [{
            "id": 10,
            "title": "orphan",
            "content": "x",
            "folderId": 3,
            "tags": [4, 5],
            "isPinned": false,
            "isDeleted": false,
            "createdAt": "2026-02-01T00:00:00.000Z",
            "updatedAt": "2026-02-02T00:00:00.000Z"
        }],
        "folders": [],
        "tags": [],
        "exportedAt": "2026-02-03T00:00:00.000Z"
    }"#;

    let store = NotesStore::in_memory();
    let summary = store.restore_snapshot(json).unwrap();
    assert_eq!(summary.notes, 1);
    assert_eq!(summary.dropped_references, 3);

    let note = &store.get_all_notes().unwrap()[0];
    assert_eq!(note.title, "orphan");
    assert_eq!(note.folder_id, None);
    assert!(note.tags.is_empty());
}

#[test]
fn restore_snapshot_rejects_malformed_documents_without_writing() {
    let store = NotesStore::in_memory();
    let err = store.restore_snapshot("{ not json").unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));

    let inconsistent = r#"{
        "notes": [
            { "id": 1, "title": "fine", "content": "", "isPinned": false, "isDeleted": false,
              "createdAt": "2026-02-01T00:00:00Z", "updatedAt": "2026-02-01T00:00:00Z" },
            { "id": 2, "title": "bad", "content": "", "isPinned": false, "isDeleted": true,
              "createdAt": "2026-02-01T00:00:00Z", "updatedAt": "2026-02-01T00:00:00Z" }
        ],
        "folders": [{ "id": 1, "name": "F", "icon": "", "createdAt": "2026-02-01T00:00:00Z" }],
        "exportedAt": "2026-02-03T00:00:00Z"
    }"#;
    let err = store.restore_snapshot(inconsistent).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.get_all_notes().unwrap().is_empty());
    assert!(store.get_all_folders().unwrap().is_empty());
}
