use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NamespaceStore;

pub fn add<S: NamespaceStore>(store: &mut S, from: &str, to: &str) -> Result<CmdResult> {
    store.add_alias(from, to)?;
    let map = store.get_alias()?;
    let canonical = map.get(from).unwrap_or(to);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Alias added: {} -> {}",
        from.trim().to_lowercase(),
        canonical
    )));
    result.add_message(CmdMessage::info(
        "Stored entries are unchanged; run `gaia admin --format` to apply it",
    ));
    Ok(result)
}

pub fn remove<S: NamespaceStore>(store: &mut S, keyword: &str) -> Result<CmdResult> {
    let message = if store.remove_alias(keyword)? {
        CmdMessage::success(format!("Alias removed: {}", keyword))
    } else {
        CmdMessage::info(format!("No alias for {}", keyword))
    };
    Ok(CmdResult::default().with_message(message))
}
