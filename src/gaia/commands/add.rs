use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Entry;
use crate::store::NamespaceStore;

pub fn run<S: NamespaceStore>(store: &mut S, entry: Entry) -> Result<CmdResult> {
    let id = store.add(entry)?;
    let added = store.get_by_id(&id)?;

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Entry added ({}): {}",
            id, added.name
        )))
        .with_affected_entries(vec![added]))
}
