use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NamespaceStore;

/// Keyword search, sorted by name and cut to `limit` entries.
pub fn run<S: NamespaceStore>(
    store: &S,
    category: &str,
    keywords: &[String],
    limit: usize,
) -> Result<CmdResult> {
    let mut found = store.search(category, keywords)?;
    found.sort_by(|a, b| a.name.cmp(&b.name));

    let total = found.len();
    let mut result = CmdResult::default();
    if total == 0 {
        result.add_message(CmdMessage::info("No matching entries"));
    } else if total > limit {
        found.truncate(limit);
        result.add_message(CmdMessage::info(format!(
            "Showing first {} of {} matches",
            limit, total
        )));
    }

    Ok(result.with_listed_entries(found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json::fixtures::StoreFixture;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn names(result: &CmdResult) -> Vec<&str> {
        result.listed_entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn category_and_keywords() {
        let fixture = StoreFixture::sample();
        let result = run(&fixture.store, "lang", &kw(&["golang", "sort"]), 10).unwrap();
        assert_eq!(names(&result), vec!["lang-go-sort"]);
    }

    #[test]
    fn tag_search_is_sorted() {
        let fixture = StoreFixture::sample();
        let result = run(&fixture.store, "", &kw(&["algorithm"]), 10).unwrap();
        assert_eq!(
            names(&result),
            vec!["lang-go-search", "lang-go-sort", "lang-rust-sort"]
        );
    }

    #[test]
    fn limit_cuts_results() {
        let fixture = StoreFixture::sample();
        let result = run(&fixture.store, "lang", &[], 2).unwrap();
        assert_eq!(result.listed_entries.len(), 2);
        assert!(result.messages[0].content.contains("2 of 3"));
    }

    #[test]
    fn no_match_says_so() {
        let fixture = StoreFixture::sample();
        let result = run(&fixture.store, "", &kw(&["sor"]), 10).unwrap();
        assert!(result.listed_entries.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
