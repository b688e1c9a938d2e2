use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NamespaceStore;
use crate::tree::NameTree;

/// Renders the tree of entries at or below the name formed by `segments`.
pub fn names<S: NamespaceStore>(
    store: &S,
    segments: &[String],
    max_depth: Option<usize>,
) -> Result<CmdResult> {
    let entries = store.list_by_name_prefix(segments)?;
    let prefix = store.name_prefix(segments);

    let mut result = CmdResult::default();
    if entries.is_empty() {
        let shown = if prefix.is_empty() { "." } else { prefix.as_str() };
        result.add_message(CmdMessage::info(format!("No entries under {}", shown)));
        return Ok(result);
    }

    let tree = NameTree::build(&entries, &prefix);
    Ok(result.with_tree_lines(tree.render(max_depth)))
}

/// Every category with its entry count and tags.
pub fn categories<S: NamespaceStore>(store: &S) -> Result<CmdResult> {
    let stats = store.get_stats()?;
    let mut result = CmdResult::default();
    result.categories = stats.categories.into_iter().collect();
    Ok(result)
}

/// Every tag with its entry count and categories.
pub fn tags<S: NamespaceStore>(store: &S) -> Result<CmdResult> {
    let stats = store.get_stats()?;
    let mut result = CmdResult::default();
    result.tags = stats.tags.into_iter().collect();
    Ok(result)
}

pub fn aliases<S: NamespaceStore>(store: &S) -> Result<CmdResult> {
    let map = store.get_alias()?;
    let mut result = CmdResult::default();
    result.aliases = map
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    if result.aliases.is_empty() {
        result.add_message(CmdMessage::info("No aliases defined"));
    }
    Ok(result)
}
