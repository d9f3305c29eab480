use yuzxing_core::{
    NewFolder, NewTag, NoteDraft, NoteFilter, NotePatch, NotesStore, RecordRef, StoreError,
};

#[test]
fn folders_and_tags_are_listed_in_creation_order() {
    let store = NotesStore::in_memory();
    let work = store.add_folder(NewFolder::new("Work", "briefcase")).unwrap();
    let home = store.add_folder(NewFolder::new("Home", "house")).unwrap();
    let urgent = store.add_tag(NewTag::new("urgent", "#ff0000")).unwrap();

    let folders = store.get_all_folders().unwrap();
    assert_eq!(
        folders.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![work, home]
    );
    assert_eq!(folders[0].name, "Work");
    assert_eq!(folders[0].icon, "briefcase");

    let tags = store.get_all_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, urgent);
    assert_eq!(tags[0].color, "#ff0000");
}

#[test]
fn deleting_folder_detaches_notes_without_removing_them() {
    let store = NotesStore::in_memory();
    let folder = store.add_folder(NewFolder::new("Trip", "plane")).unwrap();
    let id = store
        .add_note(NoteDraft::new("Packing", "socks").in_folder(folder))
        .unwrap();

    store.delete_folder(folder).unwrap();

    assert!(store.get_all_folders().unwrap().is_empty());
    let note = store.get_note(id).unwrap().unwrap();
    assert_eq!(note.folder_id, None);
    assert_eq!(note.content, "socks");
}

#[test]
fn deleting_tag_unlinks_it_from_notes() {
    let store = NotesStore::in_memory();
    let a = store.add_tag(NewTag::new("a", "red")).unwrap();
    let b = store.add_tag(NewTag::new("b", "blue")).unwrap();
    let id = store
        .add_note(NoteDraft::new("tagged", "").with_tags(vec![b, a]))
        .unwrap();

    store.delete_tag(b).unwrap();

    assert_eq!(store.get_note(id).unwrap().unwrap().tags, vec![a]);
}

#[test]
fn deleting_missing_folder_or_tag_reports_not_found() {
    let store = NotesStore::in_memory();
    assert!(matches!(
        store.delete_folder(5).unwrap_err(),
        StoreError::NotFound(RecordRef::Folder(5))
    ));
    assert!(matches!(
        store.delete_tag(6).unwrap_err(),
        StoreError::NotFound(RecordRef::Tag(6))
    ));
}

#[test]
fn writes_with_unknown_references_are_rejected() {
    let store = NotesStore::in_memory();
    let err = store
        .add_note(NoteDraft::new("x", "").in_folder(77))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(RecordRef::Folder(77))));

    let id = store.add_note(NoteDraft::new("x", "")).unwrap();
    let err = store
        .update_note(id, NotePatch::default().tags(vec![88]))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidReference(RecordRef::Tag(88))));

    assert_eq!(store.get_all_notes().unwrap().len(), 1);
    assert!(store.get_note(id).unwrap().unwrap().tags.is_empty());
}

#[test]
fn tags_keep_caller_order_and_drop_duplicates() {
    let store = NotesStore::in_memory();
    let a = store.add_tag(NewTag::new("a", "")).unwrap();
    let b = store.add_tag(NewTag::new("b", "")).unwrap();
    let c = store.add_tag(NewTag::new("c", "")).unwrap();
    let id = store.add_note(NoteDraft::new("n", "")).unwrap();

    let note = store
        .update_note(id, NotePatch::default().tags(vec![c, a, c, b]))
        .unwrap();
    assert_eq!(note.tags, vec![c, a, b]);
    assert_eq!(store.get_note(id).unwrap().unwrap().tags, vec![c, a, b]);
}

#[test]
fn list_notes_filters_by_folder_and_tag_with_pinned_first() {
    let store = NotesStore::in_memory();
    let work = store.add_folder(NewFolder::new("Work", "")).unwrap();
    let urgent = store.add_tag(NewTag::new("urgent", "")).unwrap();

    let plain = store
        .add_note(NoteDraft::new("plain", "").in_folder(work))
        .unwrap();
    let pinned = store
        .add_note(NoteDraft::new("pinned", "").in_folder(work).pinned(true))
        .unwrap();
    let tagged = store
        .add_note(NoteDraft::new("tagged", "").with_tags(vec![urgent]))
        .unwrap();
    let trashed = store
        .add_note(NoteDraft::new("trashed", "").in_folder(work))
        .unwrap();
    store.delete_note(trashed).unwrap();

    let in_work: Vec<i64> = store
        .list_notes(&NoteFilter {
            folder_id: Some(work),
            ..NoteFilter::default()
        })
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(in_work, vec![pinned, plain]);

    let with_tag = store
        .list_notes(&NoteFilter {
            tag_id: Some(urgent),
            ..NoteFilter::default()
        })
        .unwrap();
    assert_eq!(with_tag.len(), 1);
    assert_eq!(with_tag[0].id, tagged);

    let pinned_only = store
        .list_notes(&NoteFilter {
            pinned_only: true,
            ..NoteFilter::default()
        })
        .unwrap();
    assert_eq!(pinned_only.len(), 1);
    assert_eq!(pinned_only[0].id, pinned);

    let unpinned = store.set_pinned(pinned, false).unwrap();
    assert!(!unpinned.is_pinned);
}

#[test]
fn deleting_folder_or_tag_refreshes_updated_at_of_affected_notes() {
    let store = NotesStore::in_memory();
    let folder = store.add_folder(NewFolder::new("Trip", "")).unwrap();
    let tag = store.add_tag(NewTag::new("later", "")).unwrap();
    let in_folder = store
        .add_note(NoteDraft::new("packing", "").in_folder(folder))
        .unwrap();
    let tagged = store
        .add_note(NoteDraft::new("reading", "").with_tags(vec![tag]))
        .unwrap();
    let untouched = store.add_note(NoteDraft::new("other", "")).unwrap();
    let before = |id| store.get_note(id).unwrap().unwrap().updated_at;
    let (folder_before, tag_before, other_before) =
        (before(in_folder), before(tagged), before(untouched));

    std::thread::sleep(std::time::Duration::from_millis(20));
    store.delete_folder(folder).unwrap();
    store.delete_tag(tag).unwrap();

    let detached = store.get_note(in_folder).unwrap().unwrap();
    assert_eq!(detached.folder_id, None);
    assert!(detached.updated_at > folder_before);

    let unlinked = store.get_note(tagged).unwrap().unwrap();
    assert!(unlinked.tags.is_empty());
    assert!(unlinked.updated_at > tag_before);

    assert_eq!(before(untouched), other_before);
}
