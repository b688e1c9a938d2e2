use crate::commands::{CmdMessage, CmdResult};
use crate::editor::EntryEditor;
use crate::error::{GaiaError, Result};
use crate::model::{validate_name, Entry};
use crate::store::NamespaceStore;

/// Lets `editor` rewrite an entry, then stores the result.
///
/// Keeping the name updates the entry in place. A new name is a rename:
/// the entry is removed and added again, getting a new id.
pub fn run<S: NamespaceStore, E: EntryEditor>(
    store: &mut S,
    id: &str,
    editor: &mut E,
) -> Result<CmdResult> {
    let stored = store.get_by_id(id)?;
    let mut edited = editor.edit(&stored)?;
    edited.id = stored.id.clone();
    let mut result = CmdResult::default();

    if edited.name.trim().is_empty() {
        edited.name = stored.name.clone();
    }

    if same_payload(&stored, &edited) {
        result.add_message(CmdMessage::info(format!(
            "No changes ({}): {}",
            stored.id, stored.name
        )));
        return Ok(result.with_affected_entries(vec![stored]));
    }

    let new_name = store.name_prefix(&[edited.name.clone()]);
    if new_name == stored.name {
        store.update(edited)?;
        let updated = store.get_by_id(&stored.id)?;
        result.add_message(CmdMessage::success(format!(
            "Entry updated ({}): {}",
            updated.id, updated.name
        )));
        return Ok(result.with_affected_entries(vec![updated]));
    }

    validate_name(&new_name)?;
    let taken = store.list_by_name_prefix(&[new_name.clone()])?;
    if taken.iter().any(|e| e.name == new_name) {
        return Err(GaiaError::NameConflict(new_name));
    }

    // Remove first so the new name may reuse codes freed by the old one.
    store.remove(&stored.id)?;
    edited.id.clear();
    let new_id = match store.add(edited) {
        Ok(id) => id,
        Err(e) => {
            let mut restore = stored.clone();
            restore.id.clear();
            store.add(restore)?;
            return Err(e);
        }
    };
    let added = store.get_by_id(&new_id)?;
    result.add_message(CmdMessage::success(format!(
        "Entry renamed ({} -> {}): {} -> {}",
        stored.id, added.id, stored.name, added.name
    )));
    Ok(result.with_affected_entries(vec![added]))
}

fn same_payload(a: &Entry, b: &Entry) -> bool {
    a.name == b.name.trim()
        && a.tags == b.tags
        && a.desc == b.desc.trim()
        && a.content == b.content
        && a.executable == b.executable
        && a.exec_file == b.exec_file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::editor::{parse_document, to_document};
    use crate::store::json::fixtures::StoreFixture;
    use crate::store::InMemoryStore;

    fn editor(f: impl Fn(&mut Entry)) -> impl FnMut(&Entry) -> Result<Entry> {
        move |e: &Entry| {
            let mut e = e.clone();
            f(&mut e);
            Ok(e)
        }
    }

    #[test]
    fn unchanged_document_is_noop() {
        let mut fixture = StoreFixture::sample();
        let id = fixture.id_of("lang-go-sort");
        let result = run(&mut fixture.store, &id, &mut editor(|_| {})).unwrap();
        assert!(result.messages[0].content.starts_with("No changes"));
    }

    #[test]
    fn same_name_updates_in_place() {
        let mut fixture = StoreFixture::sample();
        let id = fixture.id_of("lang-go-sort");
        let mut ed = editor(|e| {
            e.content = "slices.Sort(xs)".to_string();
            e.tags.push("Golang".to_string());
        });
        let result = run(&mut fixture.store, &id, &mut ed).unwrap();

        let updated = &result.affected_entries[0];
        assert_eq!(updated.id, id);
        assert_eq!(updated.content, "slices.Sort(xs)");
        assert_eq!(updated.tags, vec!["algorithm", "go"]);
    }

    #[test]
    fn new_name_is_remove_then_add() {
        let mut fixture = StoreFixture::sample();
        let id = fixture.id_of("os-linux-kernel");
        let mut ed = editor(|e| e.name = "os-unix-kernel".to_string());
        let result = run(&mut fixture.store, &id, &mut ed).unwrap();

        let renamed = &result.affected_entries[0];
        assert_eq!(renamed.name, "os-unix-kernel");
        assert_ne!(renamed.id, id);
        assert_eq!(renamed.content, "uname -r");
        assert!(fixture.id_of("os-linux-kernel").is_empty());
    }

    #[test]
    fn rename_onto_existing_name_is_rejected() {
        let mut fixture = StoreFixture::sample();
        let id = fixture.id_of("lang-go-search");
        let mut ed = editor(|e| e.name = "lang-go-sort".to_string());
        let err = run(&mut fixture.store, &id, &mut ed).unwrap_err();
        assert!(matches!(err, GaiaError::NameConflict(_)));
        assert!(!fixture.id_of("lang-go-search").is_empty());
    }

    #[test]
    fn blank_name_keeps_stored_name() {
        let mut fixture = StoreFixture::sample();
        let id = fixture.id_of("lang-rust-sort");
        let mut ed = editor(|e| {
            e.name.clear();
            e.desc = "in place".to_string();
        });
        let result = run(&mut fixture.store, &id, &mut ed).unwrap();
        assert_eq!(result.affected_entries[0].name, "lang-rust-sort");
        assert_eq!(result.affected_entries[0].desc, "in place");
    }

    #[test]
    fn untouched_document_keeps_trailing_newline_and_indented_desc() {
        let mut store = InMemoryStore::new();
        let entry = Entry::new("lang-go-sort", "sort.Ints(xs)\n")
            .with_desc("line one\n  indented two");
        let id = store.add(entry).unwrap();

        let mut through_document =
            |e: &Entry| -> Result<Entry> { Ok(parse_document(&to_document(e))) };
        let result = run(&mut store, &id, &mut through_document).unwrap();

        assert_eq!(result.messages[0].level, MessageLevel::Info);
        assert!(result.messages[0].content.starts_with("No changes"));
        let kept = store.get_by_id(&id).unwrap();
        assert_eq!(kept.content, "sort.Ints(xs)\n");
        assert_eq!(kept.desc, "line one\n  indented two");
    }
}
