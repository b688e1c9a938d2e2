use crate::commands::{CmdMessage, CmdResult};
use crate::error::{GaiaError, Result};
use crate::model::Entry;
use crate::store::NamespaceStore;

/// Folds every other entry into the first one and removes them.
///
/// All entries must share a category. Descriptions and contents are joined
/// with newlines; tags are merged keeping first-seen order.
pub fn run<S: NamespaceStore, I: AsRef<str>>(store: &mut S, ids: &[I]) -> Result<CmdResult> {
    if ids.len() < 2 {
        return Err(GaiaError::Api("Merge needs at least two entries".to_string()));
    }

    let entries = ids
        .iter()
        .map(|id| store.get_by_id(id.as_ref()))
        .collect::<Result<Vec<Entry>>>()?;
    let (target, others) = entries.split_first().ok_or_else(|| {
        GaiaError::Api("Merge needs at least two entries".to_string())
    })?;

    if let Some(stray) = others.iter().find(|e| e.category != target.category) {
        return Err(GaiaError::Api(format!(
            "Cannot merge across categories: {} is in '{}', {} is in '{}'",
            target.id, target.category, stray.id, stray.category
        )));
    }
    if let Some(dup) = others.iter().find(|e| e.id == target.id) {
        return Err(GaiaError::Api(format!("Entry {} given twice", dup.id)));
    }

    let mut merged = target.clone();
    for other in others {
        merged.desc = join_text(&merged.desc, &other.desc);
        merged.content = join_text(&merged.content, &other.content);
        for tag in &other.tags {
            if !merged.tags.contains(tag) {
                merged.tags.push(tag.clone());
            }
        }
    }

    let mut result = CmdResult::default();
    store.update(merged)?;
    for other in others {
        store.remove(&other.id)?;
        result.add_message(CmdMessage::info(format!(
            "Merged ({}): {}",
            other.id, other.name
        )));
    }
    let merged = store.get_by_id(&target.id)?;
    result.add_message(CmdMessage::success(format!(
        "Merged {} entries into ({}): {}",
        others.len(),
        merged.id,
        merged.name
    )));

    Ok(result.with_affected_entries(vec![merged]))
}

fn join_text(a: &str, b: &str) -> String {
    match (a.trim(), b.trim()) {
        ("", b) => b.to_string(),
        (a, "") => a.to_string(),
        (a, b) => format!("{}\n{}", a, b),
    }
}
