use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::NamespaceStore;

pub fn run<S: NamespaceStore>(store: &S) -> Result<CmdResult> {
    Ok(CmdResult::default().with_stats(store.get_stats()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json::fixtures::StoreFixture;

    #[test]
    fn counts_entries_categories_and_tags() {
        let fixture = StoreFixture::sample();
        let stats = run(&fixture.store).unwrap().stats.unwrap();
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.category_count(), 2);
        assert_eq!(stats.tag_count(), 2);
        assert_eq!(stats.categories["os"].entries, 1);
        assert!(stats.tags["uname"].categories.contains("os"));
    }
}
