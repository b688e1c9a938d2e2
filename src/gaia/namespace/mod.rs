//! # Namespace
//!
//! The namespace is everything needed to allocate and interpret ids: the alias
//! map, the category and branch prefix tables, and the index of live entries.
//! It is an explicit value owned by whoever operates on it (a store, a test),
//! never process-wide state.
//!
//! ## Mutation Flow
//!
//! ```text
//! normalize (aliases) -> allocate / reclaim (allocator) -> mutate (index)
//! ```
//!
//! Persisting the result is the caller's concern. Every operation here either
//! succeeds completely or leaves the namespace as it found it.
//!
//! ## Persisted Layout
//!
//! Serializes to a single object:
//!
//! ```text
//! {
//!   "AliasMap":      { "golang": "go" },
//!   "CategoryIdMap": { "lang": "6" },
//!   "BranchIdMap":   { "lang-go": "61" },
//!   "NameIdMap":     { "lang-go-sort": "6100" },
//!   "NodeMap":       { "6100": { "Id": "6100", "Name": "lang-go-sort", ... } }
//! }
//! ```

pub mod allocator;
pub mod index;

use crate::alias::AliasMap;
use crate::error::{GaiaError, Result};
use crate::model::{category_of, Entry, Stats};
use crate::search::SearchQuery;
use allocator::{PrefixMap, PrefixTables};
use index::NamespaceIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Namespace {
    alias_map: AliasMap,
    #[serde(flatten)]
    prefixes: PrefixTables,
    #[serde(flatten)]
    index: NamespaceIndex,
}

/// Outcome of re-normalizing every stored entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatReport {
    /// Entries whose tags, category or description changed in place.
    pub updated: usize,
    /// Entries whose name changed and were re-allocated: (old id, new id, new name).
    pub renamed: Vec<(String, String, String)>,
    /// Names left untouched because their normalized form was unusable.
    pub conflicts: Vec<String>,
}

/// Outcome of rebuilding every id from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorgReport {
    pub entries: usize,
    pub reassigned: usize,
}

type RawMap = Option<BTreeMap<String, serde_json::Value>>;

/// The on-disk shape, read leniently: maps may be missing or null, and each
/// value is decoded on its own so one bad record cannot sink the load.
#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct RawNamespace {
    alias_map: RawMap,
    category_id_map: RawMap,
    branch_id_map: RawMap,
    name_id_map: RawMap,
    node_map: RawMap,
}

/// Keeps the string-valued pairs of a persisted map, warning about the rest.
fn string_pairs(map: RawMap, what: &str) -> Vec<(String, String)> {
    map.unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key, s)),
            other => {
                tracing::warn!(map = what, %key, value = %other, "skipping non-string value");
                None
            }
        })
        .collect()
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the persisted layout. Undecodable nodes are skipped with a warning.
    pub fn from_json(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawNamespace = serde_json::from_str(content)?;

        let mut alias_map: AliasMap = string_pairs(raw.alias_map, "AliasMap").into_iter().collect();
        alias_map.tidy();

        let trimmed = |m: RawMap, what: &str| -> PrefixMap {
            string_pairs(m, what)
                .into_iter()
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect()
        };
        let prefixes = PrefixTables::new(
            trimmed(raw.category_id_map, "CategoryIdMap"),
            trimmed(raw.branch_id_map, "BranchIdMap"),
        );

        let mut index = NamespaceIndex::default();
        for (key, value) in raw.node_map.unwrap_or_default() {
            let mut entry: Entry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(id = %key, error = %e, "skipping undecodable entry");
                    continue;
                }
            };
            entry.id = key.trim().to_string();
            entry.name = entry.name.trim().to_string();
            entry.category = category_of(&entry.name).to_string();
            let name = entry.name.clone();
            if !index.insert(entry) {
                tracing::warn!(id = %key, %name, "skipping entry with duplicated name or id");
            }
        }

        for (name, id) in string_pairs(raw.name_id_map, "NameIdMap") {
            if index.id_of(name.trim()) != Some(id.trim()) {
                tracing::warn!(%name, %id, "dropping dangling name mapping");
            }
        }

        Ok(Self {
            alias_map,
            prefixes,
            index,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.alias_map
    }

    pub fn prefixes(&self) -> &PrefixTables {
        &self.prefixes
    }

    pub fn index(&self) -> &NamespaceIndex {
        &self.index
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.index.entries()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Normalizes the name, category and tags against the current alias map.
    pub fn normalize_entry(&self, entry: &mut Entry) -> Result<()> {
        self.alias_map.normalize_entry(entry)
    }

    /// Adds a new entry and returns its id.
    pub fn add(&mut self, mut entry: Entry) -> Result<String> {
        if !entry.id.trim().is_empty() {
            return Err(GaiaError::Api(format!(
                "new entries must not carry an id (got '{}')",
                entry.id
            )));
        }
        self.normalize_entry(&mut entry)?;
        if self.index.id_of(&entry.name).is_some() {
            return Err(GaiaError::NameConflict(entry.name));
        }

        let index = &self.index;
        let id = self
            .prefixes
            .allocate(&entry.name, |candidate| index.contains_id(candidate))?;

        tracing::debug!(%id, name = %entry.name, "allocated id");
        entry.id = id.clone();
        if !self.index.insert(entry) {
            return Err(GaiaError::Store(format!("id {} allocated twice", id)));
        }
        Ok(id)
    }

    /// Replaces the payload of an existing entry. The name may not change.
    pub fn update(&mut self, mut entry: Entry) -> Result<()> {
        self.normalize_entry(&mut entry)?;
        self.index.check_update(&entry)?;
        self.index.replace(entry);
        Ok(())
    }

    pub fn append(&mut self, id: &str, extra: &str) -> Result<()> {
        let mut entry = self.get(id)?.clone();
        entry.append_content(extra);
        self.index.replace(entry);
        Ok(())
    }

    /// Removes an entry, freeing its category code if it was the last one there.
    pub fn remove(&mut self, id: &str) -> Result<Entry> {
        let removed = self
            .index
            .remove(id.trim())
            .ok_or_else(|| GaiaError::NotFound(id.to_string()))?;

        if !self.index.has_category(&removed.category) {
            self.prefixes.reclaim_category(&removed.category);
        }
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Result<&Entry> {
        self.index
            .get(id.trim())
            .ok_or_else(|| GaiaError::NotFound(id.to_string()))
    }

    /// Entries at or below the name formed by joining `names` with dashes.
    pub fn list_by_name_prefix<S: AsRef<str>>(&self, names: &[S]) -> Vec<Entry> {
        let prefix = self.normalize_prefix(names);
        self.index
            .list_by_prefix(&prefix)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn normalize_prefix<S: AsRef<str>>(&self, names: &[S]) -> String {
        self.alias_map.normalize_prefix(names)
    }

    pub fn search<S: AsRef<str>>(&self, category: &str, keywords: &[S]) -> Vec<Entry> {
        let query = SearchQuery::new(&self.alias_map, category, keywords);
        query.filter(self.index.entries()).into_iter().cloned().collect()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_entries(self.index.entries())
    }

    pub fn add_alias(&mut self, from: &str, to: &str) -> Result<()> {
        self.alias_map.add(from, to)
    }

    pub fn remove_alias(&mut self, keyword: &str) -> bool {
        self.alias_map.remove(keyword)
    }

    /// Re-normalizes every stored name and tag list against the current alias map.
    pub fn format_data(&mut self) -> Result<FormatReport> {
        self.alias_map.tidy();
        let mut report = FormatReport::default();

        let ids: Vec<String> = self.index.ids().map(str::to_string).collect();
        for id in ids {
            let Some(stored) = self.index.get(&id).cloned() else {
                continue;
            };
            let mut normalized = stored.clone();
            if let Err(e) = self.normalize_entry(&mut normalized) {
                tracing::warn!(%id, error = %e, "cannot normalize entry");
                report.conflicts.push(stored.name);
                continue;
            }
            if normalized == stored {
                continue;
            }
            if normalized.name == stored.name {
                self.index.replace(normalized);
                report.updated += 1;
                continue;
            }
            if self.index.id_of(&normalized.name).is_some() {
                tracing::warn!(%id, name = %normalized.name, "normalized name already taken");
                report.conflicts.push(stored.name);
                continue;
            }

            let snapshot = self.clone();
            self.remove(&id)?;
            normalized.id.clear();
            match self.add(normalized) {
                Ok(new_id) => {
                    let name = self.index.get(&new_id).map(|e| e.name.clone()).unwrap_or_default();
                    report.renamed.push((id, new_id, name));
                }
                Err(e) => {
                    tracing::warn!(%id, error = %e, "re-allocation failed, entry kept as is");
                    *self = snapshot;
                    report.conflicts.push(stored.name);
                }
            }
        }

        tracing::info!(
            updated = report.updated,
            renamed = report.renamed.len(),
            conflicts = report.conflicts.len(),
            "formatted namespace"
        );
        Ok(report)
    }

    /// Throws away every prefix binding and allocates all ids again, in name
    /// order. Either every entry is re-added or nothing changes.
    pub fn reorganize(&mut self) -> Result<ReorgReport> {
        let mut entries: Vec<Entry> = self.index.entries().cloned().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut fresh = Namespace {
            alias_map: self.alias_map.clone(),
            ..Default::default()
        };
        let mut report = ReorgReport::default();
        for mut entry in entries {
            let old_id = std::mem::take(&mut entry.id);
            let new_id = fresh.add(entry)?;
            report.entries += 1;
            if new_id != old_id {
                report.reassigned += 1;
            }
        }

        *self = fresh;
        tracing::info!(entries = report.entries, reassigned = report.reassigned, "reorganized namespace");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Level;
    use crate::tree::NameTree;

    fn add(ns: &mut Namespace, name: &str, tags: &[&str]) -> String {
        ns.add(Entry::new(name, format!("content of {}", name)).with_tags(tags.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_add_scenario_shares_branch() {
        let mut ns = Namespace::new();
        let sort = add(&mut ns, "lang-go-sort", &["algorithm"]);
        let search = add(&mut ns, "lang-go-search", &["algorithm"]);

        assert_eq!(sort.len(), 4);
        assert_eq!(search.len(), 4);
        assert_ne!(sort, search);
        assert_eq!(sort[..2], search[..2]);

        let listed = ns.list_by_name_prefix(&["lang", "go"]);
        let tree = NameTree::build(&listed, &ns.normalize_prefix(&["lang", "go"]));
        let expected = vec![
            "go".to_string(),
            format!("├── search({})", search),
            format!("└── sort({})", sort),
        ];
        assert_eq!(tree.render(None), expected);
    }

    #[test]
    fn test_add_same_name_conflicts_before_allocation() {
        let mut ns = Namespace::new();
        add(&mut ns, "lang-go-sort", &[]);
        let before = ns.clone();
        let err = ns.add(Entry::new("Lang-Go-Sort", "again")).unwrap_err();
        assert!(matches!(err, GaiaError::NameConflict(name) if name == "lang-go-sort"));
        assert_eq!(ns, before);
    }

    #[test]
    fn test_add_rejects_preset_id_and_bad_names() {
        let mut ns = Namespace::new();
        let mut entry = Entry::new("lang", "x");
        entry.id = "6".to_string();
        assert!(matches!(ns.add(entry), Err(GaiaError::Api(_))));
        assert!(matches!(
            ns.add(Entry::new("lang--go", "x")),
            Err(GaiaError::InvalidName(_))
        ));
        assert!(matches!(ns.add(Entry::new("  ", "x")), Err(GaiaError::InvalidName(_))));
    }

    #[test]
    fn test_id_length_by_depth() {
        let mut ns = Namespace::new();
        assert_eq!(add(&mut ns, "lang", &[]).len(), 1);
        assert_eq!(add(&mut ns, "lang-go", &[]).len(), 2);
        assert_eq!(add(&mut ns, "lang-go-sort", &[]).len(), 4);
        assert_eq!(add(&mut ns, "lang-go-sort-merge-k", &[]).len(), 4);
    }

    #[test]
    fn test_seventeenth_category_is_exhausted() {
        let mut ns = Namespace::new();
        for i in 0..16 {
            add(&mut ns, &format!("cat{}", i), &[]);
        }
        let before = ns.clone();
        let err = ns.add(Entry::new("cat16", "x")).unwrap_err();
        assert!(matches!(err, GaiaError::NamespaceExhausted(Level::Category)));
        assert_eq!(ns, before);
    }

    #[test]
    fn test_leaf_exhaustion_commits_nothing() {
        let mut ns = Namespace::new();
        for i in 0..256 {
            add(&mut ns, &format!("lang-go-n{}", i), &[]);
        }
        let before = ns.clone();
        let err = ns.add(Entry::new("lang-go-overflow", "x")).unwrap_err();
        assert!(matches!(err, GaiaError::NamespaceExhausted(Level::Leaf)));
        assert_eq!(ns, before);
    }

    #[test]
    fn test_removing_category_frees_its_code() {
        let mut ns = Namespace::new();
        let a = add(&mut ns, "self-notes", &[]);
        let b = add(&mut ns, "self-todo-today", &[]);
        add(&mut ns, "math", &[]);
        let self_code = &a[..1];

        ns.remove(&a).unwrap();
        assert_eq!(ns.prefixes().categories().get("self"), Some(self_code));
        ns.remove(&b).unwrap();
        assert_eq!(ns.prefixes().categories().get("self"), None);

        let reused = add(&mut ns, "db", &[]);
        assert_eq!(reused, self_code);
    }

    #[test]
    fn test_removal_keeps_category_shared_by_prefix_lookalike() {
        let mut ns = Namespace::new();
        let go = add(&mut ns, "go", &[]);
        add(&mut ns, "golang-x", &[]);
        ns.remove(&go).unwrap();
        assert_eq!(ns.prefixes().categories().get("go"), None);
        assert!(ns.prefixes().categories().get("golang").is_some());
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut ns = Namespace::new();
        assert!(matches!(ns.remove("ff"), Err(GaiaError::NotFound(_))));
    }

    #[test]
    fn test_update_payload_and_branch_guard() {
        let mut ns = Namespace::new();
        let id = add(&mut ns, "lang-go-sort", &["algorithm"]);

        let mut entry = ns.get(&id).unwrap().clone();
        entry.content = "sort.Ints(xs)".to_string();
        entry.tags = vec!["Algo".to_string()];
        ns.update(entry).unwrap();
        assert_eq!(ns.get(&id).unwrap().content, "sort.Ints(xs)");
        assert_eq!(ns.get(&id).unwrap().tags, vec!["algo"]);

        let mut moved = ns.get(&id).unwrap().clone();
        moved.name = "lang-rust-sort".to_string();
        assert!(matches!(ns.update(moved), Err(GaiaError::BranchChanged { .. })));

        let mut renamed = ns.get(&id).unwrap().clone();
        renamed.name = "lang-go-qsort".to_string();
        assert!(matches!(ns.update(renamed), Err(GaiaError::Api(_))));

        let mut missing = Entry::new("lang-go-sort", "x");
        missing.id = "ffff".to_string();
        assert!(matches!(ns.update(missing), Err(GaiaError::NotFound(_))));
    }

    #[test]
    fn test_append_joins_with_blank_line() {
        let mut ns = Namespace::new();
        let id = add(&mut ns, "os-linux", &[]);
        ns.append(&id, "  uname -r \n").unwrap();
        assert_eq!(ns.get(&id).unwrap().content, "content of os-linux\n\nuname -r");
        assert!(matches!(ns.append("zz", "x"), Err(GaiaError::NotFound(_))));
    }

    #[test]
    fn test_names_and_tags_are_normalized_with_aliases() {
        let mut ns = Namespace::new();
        ns.add_alias("golang", "go").unwrap();
        let id = add(&mut ns, " Lang-Golang-Sort ", &["Golang, SORT"]);
        let entry = ns.get(&id).unwrap();
        assert_eq!(entry.name, "lang-go-sort");
        assert_eq!(entry.category, "lang");
        assert_eq!(entry.tags, vec!["go", "sort"]);
    }

    #[test]
    fn test_search_through_namespace() {
        let mut ns = Namespace::new();
        ns.add_alias("golang", "go").unwrap();
        add(&mut ns, "lang-go-sort", &["algorithm"]);
        add(&mut ns, "lang-go-search", &["algorithm"]);
        add(&mut ns, "algorithm-sort-go", &[]);

        let found = ns.search("lang", &["golang", "sort"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "lang-go-sort");
        assert_eq!(ns.search::<&str>("lang", &[]).len(), 2);
    }

    #[test]
    fn test_format_data_applies_new_aliases() {
        let mut ns = Namespace::new();
        let old_id = add(&mut ns, "lang-golang-sort", &["golang"]);
        let tagged = add(&mut ns, "os-linux", &["golang"]);
        ns.add_alias("golang", "go").unwrap();

        let report = ns.format_data().unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.renamed.len(), 1);
        assert!(report.conflicts.is_empty());

        assert_eq!(ns.get(&tagged).unwrap().tags, vec!["go"]);
        let (from, to, name) = &report.renamed[0];
        assert_eq!(from, &old_id);
        assert_eq!(name, "lang-go-sort");
        assert_eq!(ns.index().id_of("lang-go-sort"), Some(to.as_str()));
        assert!(ns.index().id_of("lang-golang-sort").is_none());
    }

    #[test]
    fn test_format_data_reports_collisions() {
        let mut ns = Namespace::new();
        add(&mut ns, "lang-go", &[]);
        add(&mut ns, "lang-golang", &[]);
        ns.add_alias("golang", "go").unwrap();

        let report = ns.format_data().unwrap();
        assert_eq!(report.conflicts, vec!["lang-golang".to_string()]);
        assert_eq!(ns.len(), 2);
    }

    #[test]
    fn test_reorganize_compacts_codes() {
        let mut ns = Namespace::new();
        let a = add(&mut ns, "aaa-x", &[]);
        add(&mut ns, "zzz-y", &[]);
        ns.remove(&a).unwrap();
        assert_eq!(ns.prefixes().branches().len(), 2);

        let report = ns.reorganize().unwrap();
        assert_eq!(report.entries, 1);
        assert_eq!(report.reassigned, 1);
        assert_eq!(ns.prefixes().branches().len(), 1);
        assert_eq!(ns.index().id_of("zzz-y"), Some("00"));
    }

    #[test]
    fn test_json_layout_roundtrip() {
        let mut ns = Namespace::new();
        ns.add_alias("golang", "go").unwrap();
        add(&mut ns, "lang-go-sort", &["algorithm"]);
        add(&mut ns, "lang", &[]);

        let json = ns.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["AliasMap", "CategoryIdMap", "BranchIdMap", "NameIdMap", "NodeMap"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["NodeMap"]["0000"]["Tags"], "algorithm");

        let loaded = Namespace::from_json(&json).unwrap();
        assert_eq!(loaded, ns);
    }

    #[test]
    fn test_from_json_skips_bad_records_and_tolerates_nulls() {
        let raw = r#"{
            "AliasMap": null,
            "CategoryIdMap": {"lang": "6"},
            "BranchIdMap": null,
            "NameIdMap": {"lang": "6", "lost": "7"},
            "NodeMap": {
                "6": {"Id": "6", "Name": "lang", "Tags": "a,b", "Content": "ok"},
                "7": {"Id": "7", "Name": 42}
            }
        }"#;
        let ns = Namespace::from_json(raw).unwrap();
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get("6").unwrap().tags, vec!["a", "b"]);
        assert!(ns.index().id_of("lost").is_none());
        assert!(ns.prefixes().branches().is_empty());
    }

    #[test]
    fn test_from_json_skips_non_string_map_values() {
        let raw = r#"{
            "AliasMap": {"golang": "go", "bad": 5},
            "CategoryIdMap": {"lang": "0", "os": [1]},
            "BranchIdMap": {"lang-go": {}},
            "NameIdMap": {"lang": 0},
            "NodeMap": {"0": {"Id": "0", "Name": "lang"}}
        }"#;
        let ns = Namespace::from_json(raw).unwrap();
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get("0").unwrap().name, "lang");
        assert_eq!(ns.aliases().get("golang"), Some("go"));
        assert_eq!(ns.aliases().len(), 1);
        assert_eq!(ns.prefixes().categories().get("lang"), Some("0"));
        assert!(ns.prefixes().categories().get("os").is_none());
        assert!(ns.prefixes().branches().is_empty());
    }

    #[test]
    fn test_from_json_empty_and_invalid() {
        assert!(Namespace::from_json("").unwrap().is_empty());
        assert!(matches!(
            Namespace::from_json("{not json"),
            Err(GaiaError::Serialization(_))
        ));
    }
}
