use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NamespaceStore;

/// Removes an entry for good. Asking for confirmation is the caller's job.
pub fn run<S: NamespaceStore>(store: &mut S, id: &str) -> Result<CmdResult> {
    let removed = store.remove(id)?;
    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Entry removed ({}): {}",
            removed.id, removed.name
        )))
        .with_affected_entries(vec![removed]))
}
