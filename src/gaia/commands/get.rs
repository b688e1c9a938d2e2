use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::NamespaceStore;

pub fn run<S: NamespaceStore>(store: &S, id: &str) -> Result<CmdResult> {
    let entry = store.get_by_id(id)?;
    Ok(CmdResult::default().with_affected_entries(vec![entry]))
}
