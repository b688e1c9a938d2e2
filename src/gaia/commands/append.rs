use crate::commands::{CmdMessage, CmdResult};
use crate::error::{GaiaError, Result};
use crate::store::NamespaceStore;

pub fn run<S: NamespaceStore>(store: &mut S, id: &str, text: &str) -> Result<CmdResult> {
    if text.trim().is_empty() {
        return Err(GaiaError::Api("Nothing to append".to_string()));
    }
    store.append(id, text)?;
    let entry = store.get_by_id(id)?;

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Appended to ({}): {}",
            entry.id, entry.name
        )))
        .with_affected_entries(vec![entry]))
}
