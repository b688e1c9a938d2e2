//! # Alias Resolution
//!
//! Every name, tag and category is normalized before it enters the namespace,
//! and every search keyword is normalized the same way before it is matched.
//! That keeps the write side and the read side in one token space.
//!
//! Normalizing a token means trimming it, lower-casing it and replacing it with
//! its canonical keyword when the alias map has one. Unknown tokens pass through.
//!
//! ## No Chains
//!
//! The map never holds `a -> b` together with `b -> c`: targets are resolved when
//! an alias is added, and existing aliases that pointed at the new key are
//! redirected. Together with single-token keys and targets this makes
//! normalization idempotent.
//!
//! Changing the map does not touch stored entries; that is the job of the
//! explicit `FormatData` operation.

use crate::error::{GaiaError, Result};
use crate::model::{category_of, validate_name, Entry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a compound string is split before each token is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Dash separated entry names.
    Name,
    /// Comma separated tag lists.
    Tags,
    /// A single token.
    None,
}

impl Separator {
    fn as_char(&self) -> Option<char> {
        match self {
            Separator::Name => Some('-'),
            Separator::Tags => Some(','),
            Separator::None => None,
        }
    }
}

/// Keyword to canonical keyword, many to one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(BTreeMap<String, String>);

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one token: trim, lowercase, then look up.
    pub fn resolve(&self, token: &str) -> String {
        let token = clean(token);
        match self.0.get(&token) {
            Some(canonical) => canonical.clone(),
            None => token,
        }
    }

    /// Normalizes a compound string token by token.
    pub fn normalize(&self, input: &str, sep: Separator) -> String {
        match sep.as_char() {
            None => self.resolve(input),
            Some(c) => clean(input)
                .split(c)
                .map(|token| self.resolve(token))
                .collect::<Vec<_>>()
                .join(&c.to_string()),
        }
    }

    /// Normalizes a tag list, dropping blanks and duplicates (first one wins).
    pub fn normalize_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(tags.len());
        for raw in tags {
            for token in raw.as_ref().split(',') {
                let tag = self.resolve(token);
                if !tag.is_empty() && !out.contains(&tag) {
                    out.push(tag);
                }
            }
        }
        out
    }

    /// Normalizes search keywords. Blank keywords are dropped.
    pub fn normalize_keywords<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<String> {
        keywords
            .iter()
            .map(|k| self.resolve(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Joins name segments with dashes and normalizes the result as a name.
    /// Blank segments are dropped, so an empty list yields the empty prefix.
    pub fn normalize_prefix<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let joined = segments
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        self.normalize(&joined, Separator::Name)
    }

    /// Normalizes an entry's name, category and tags in place, then validates
    /// the resulting name.
    pub fn normalize_entry(&self, entry: &mut Entry) -> Result<()> {
        entry.id = entry.id.trim().to_string();
        entry.name = self.normalize(&entry.name, Separator::Name);
        validate_name(&entry.name)?;
        entry.category = category_of(&entry.name).to_string();
        entry.tags = self.normalize_tags(&entry.tags);
        if let Some(bad) = entry.tags.iter().find(|t| t.contains('|')) {
            return Err(GaiaError::InvalidName(bad.clone()));
        }
        entry.desc = entry.desc.trim().to_string();
        Ok(())
    }

    /// Maps `from` to the canonical form of `to`.
    pub fn add(&mut self, from: &str, to: &str) -> Result<()> {
        let from = clean(from);
        let to = clean(to);
        validate_token(&from)?;
        validate_token(&to)?;

        let target = self.resolve(&to);
        if target == from {
            return Err(GaiaError::InvalidAlias(format!(
                "'{}' would resolve to itself",
                from
            )));
        }

        for canonical in self.0.values_mut() {
            if *canonical == from {
                *canonical = target.clone();
            }
        }
        self.0.insert(from, target);
        Ok(())
    }

    /// Removes an alias. Returns false when there was nothing to remove.
    pub fn remove(&mut self, keyword: &str) -> bool {
        self.0.remove(&clean(keyword)).is_some()
    }

    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.0.get(&clean(keyword)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rebuilds the map with cleaned keys and values, as loaded data may predate
    /// the cleaning rules. Pairs that would form a chain are re-added through [`add`].
    ///
    /// [`add`]: AliasMap::add
    pub fn tidy(&mut self) {
        let old = std::mem::take(&mut self.0);
        for (from, to) in old {
            if let Err(e) = self.add(&from, &to) {
                tracing::warn!(%from, %to, error = %e, "dropping unusable alias");
            }
        }
    }
}

impl FromIterator<(String, String)> for AliasMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = AliasMap::new();
        for (from, to) in iter {
            if let Err(e) = map.add(&from, &to) {
                tracing::warn!(%from, %to, error = %e, "dropping unusable alias");
            }
        }
        map
    }
}

fn clean(token: &str) -> String {
    token.trim().to_lowercase()
}

fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(GaiaError::InvalidAlias("keyword cannot be empty".to_string()));
    }
    if let Some(c) = token
        .chars()
        .find(|c| matches!(c, '-' | ',' | '|') || c.is_whitespace())
    {
        return Err(GaiaError::InvalidAlias(format!(
            "'{}' contains '{}' (aliases are single keywords)",
            token, c
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AliasMap {
        let mut map = AliasMap::new();
        map.add("golang", "go").unwrap();
        map.add("JS", "javascript").unwrap();
        map
    }

    #[test]
    fn test_resolve_lowercases_and_trims() {
        let map = sample();
        assert_eq!(map.resolve("  GoLang "), "go");
        assert_eq!(map.resolve("Rust"), "rust");
    }

    #[test]
    fn test_normalize_name_segments() {
        let map = sample();
        assert_eq!(map.normalize(" Lang-Golang-Sort ", Separator::Name), "lang-go-sort");
        assert_eq!(map.normalize("web-js", Separator::Name), "web-javascript");
    }

    #[test]
    fn test_normalize_single_token_does_not_split() {
        let map = sample();
        assert_eq!(map.normalize("golang-x", Separator::None), "golang-x");
    }

    #[test]
    fn test_normalize_tags_dedups_and_drops_blanks() {
        let map = sample();
        let tags = map.normalize_tags(&["Go, golang ,,sort", "SORT"]);
        assert_eq!(tags, vec!["go", "sort"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let map = sample();
        for input in ["Lang-Golang-Sort", "js", " x-Y-z ", "", "golang,js"] {
            for sep in [Separator::Name, Separator::Tags, Separator::None] {
                let once = map.normalize(input, sep);
                assert_eq!(map.normalize(&once, sep), once, "input {:?}", input);
            }
        }
    }

    #[test]
    fn test_add_resolves_target_to_canonical() {
        let mut map = sample();
        map.add("gol", "golang").unwrap();
        assert_eq!(map.get("gol"), Some("go"));
    }

    #[test]
    fn test_add_redirects_existing_aliases() {
        let mut map = AliasMap::new();
        map.add("py3", "python").unwrap();
        map.add("python", "py").unwrap();
        assert_eq!(map.get("py3"), Some("py"));
        assert_eq!(map.resolve("py3"), map.resolve(&map.resolve("py3")));
    }

    #[test]
    fn test_add_rejects_self_and_compound_tokens() {
        let mut map = sample();
        assert!(matches!(map.add("go", "golang"), Err(GaiaError::InvalidAlias(_))));
        assert!(matches!(map.add("a-b", "c"), Err(GaiaError::InvalidAlias(_))));
        assert!(matches!(map.add("a", "b c"), Err(GaiaError::InvalidAlias(_))));
        assert!(matches!(map.add("", "x"), Err(GaiaError::InvalidAlias(_))));
    }

    #[test]
    fn test_remove_missing_alias_is_noop() {
        let mut map = sample();
        assert!(map.remove(" GOLANG "));
        assert!(!map.remove("golang"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_normalize_prefix_joins_segments() {
        let map = sample();
        assert_eq!(map.normalize_prefix(&["Lang", " golang ", ""]), "lang-go");
        assert_eq!(map.normalize_prefix::<&str>(&[]), "");
    }

    #[test]
    fn test_normalize_entry() {
        let map = sample();
        let mut entry = Entry::new(" Web-JS-Fetch ", "fetch(url)").with_tags(["Golang", "golang"]);
        map.normalize_entry(&mut entry).unwrap();
        assert_eq!(entry.name, "web-javascript-fetch");
        assert_eq!(entry.category, "web");
        assert_eq!(entry.tags, vec!["go"]);

        let mut bad = Entry::new("web--js", "");
        assert!(matches!(map.normalize_entry(&mut bad), Err(GaiaError::InvalidName(_))));
    }

    #[test]
    fn test_tidy_breaks_loaded_chains() {
        let raw = r#"{"a":"b","b":"c"," D ":"e"}"#;
        let mut map: AliasMap = serde_json::from_str(raw).unwrap();
        map.tidy();
        assert_eq!(map.resolve("a"), "c");
        assert_eq!(map.resolve("d"), "e");
        assert_eq!(map.resolve(&map.resolve("a")), "c");
    }
}
