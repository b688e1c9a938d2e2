use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NamespaceStore;

/// Re-normalizes every stored entry against the current aliases.
pub fn format<S: NamespaceStore>(store: &mut S) -> Result<CmdResult> {
    let report = store.format_data()?;
    let mut result = CmdResult::default();

    for (old_id, new_id, name) in &report.renamed {
        result.add_message(CmdMessage::info(format!(
            "Renamed ({} -> {}): {}",
            old_id, new_id, name
        )));
    }
    for name in &report.conflicts {
        result.add_message(CmdMessage::warning(format!(
            "Left unchanged, normalized name is unusable: {}",
            name
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Formatted: {} updated, {} renamed, {} conflicts",
        report.updated,
        report.renamed.len(),
        report.conflicts.len()
    )));
    Ok(result)
}

/// Reallocates every id, compacting the category and branch code space.
pub fn reorganize<S: NamespaceStore>(store: &mut S) -> Result<CmdResult> {
    let report = store.reorganize()?;
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Reorganized {} entries, {} got a new id",
        report.entries, report.reassigned
    ))))
}
