//! Boolean keyword search.
//!
//! A query is an optional category plus a list of keywords. An entry matches when
//! its category equals the query category (if one is given) and every keyword is
//! one of the entry's keywords: the name segments after the category, or a tag.
//! Matching is exact token equality; there is no substring or OR matching.

use crate::alias::AliasMap;
use crate::model::Entry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub category: String,
    pub keywords: Vec<String>,
}

impl SearchQuery {
    /// Builds a query the way the store sees it: keywords go through alias
    /// resolution, the category is only trimmed and lower-cased.
    pub fn new<S: AsRef<str>>(aliases: &AliasMap, category: &str, keywords: &[S]) -> Self {
        Self {
            category: category.trim().to_lowercase(),
            keywords: aliases.normalize_keywords(keywords),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.category.is_empty() && entry.category != self.category {
            return false;
        }
        let keywords = entry.keywords();
        self.keywords.iter().all(|k| keywords.contains(k.as_str()))
    }

    /// Filters `entries`, keeping their order.
    pub fn filter<'a, I>(&self, entries: I) -> Vec<&'a Entry>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new("lang-go-sort", "").with_tags(["algorithm"]),
            Entry::new("lang-go-search", "").with_tags(["algorithm", "binary"]),
            Entry::new("lang-rust-sort", "").with_tags(["algorithm"]),
            Entry::new("algorithm-sort-go", ""),
        ]
    }

    fn names(found: Vec<&Entry>) -> Vec<&str> {
        found.into_iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_category_and_all_keywords() {
        let all = entries();
        let query = SearchQuery::new(&AliasMap::new(), "lang", &["go", "sort"]);
        assert_eq!(names(query.filter(&all)), vec!["lang-go-sort"]);
    }

    #[test]
    fn test_empty_keywords_match_whole_category() {
        let all = entries();
        let query = SearchQuery::new::<&str>(&AliasMap::new(), "lang", &[]);
        assert_eq!(query.filter(&all).len(), 3);
    }

    #[test]
    fn test_category_is_not_a_keyword() {
        let all = entries();
        let query = SearchQuery::new(&AliasMap::new(), "", &["lang"]);
        assert!(query.filter(&all).is_empty());

        let query = SearchQuery::new(&AliasMap::new(), "", &["algorithm"]);
        assert_eq!(query.filter(&all).len(), 3);
    }

    #[test]
    fn test_no_substring_matching() {
        let all = entries();
        let query = SearchQuery::new(&AliasMap::new(), "", &["sea"]);
        assert!(query.filter(&all).is_empty());
    }

    #[test]
    fn test_keywords_resolve_aliases_but_category_does_not() {
        let mut aliases = AliasMap::new();
        aliases.add("golang", "go").unwrap();
        aliases.add("language", "lang").unwrap();
        let all = entries();

        let query = SearchQuery::new(&aliases, " LANG ", &["Golang", "binary"]);
        assert_eq!(names(query.filter(&all)), vec!["lang-go-search"]);

        let query = SearchQuery::new(&aliases, "language", &["golang"]);
        assert!(query.filter(&all).is_empty());
    }

    #[test]
    fn test_blank_keywords_are_ignored() {
        let all = entries();
        let query = SearchQuery::new(&AliasMap::new(), "lang", &["  ", "rust"]);
        assert_eq!(names(query.filter(&all)), vec!["lang-rust-sort"]);
    }
}
