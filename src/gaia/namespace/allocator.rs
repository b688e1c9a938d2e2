//! Hierarchical id allocation.
//!
//! Ids are built from one hex digit per category, one more per branch
//! (category + second segment) and two more for everything deeper. Added in
//! this order to an empty namespace:
//!
//! ```text
//! lang            -> 0
//! lang-go         -> 00
//! lang-go-sort    -> 0000
//! lang-go-search  -> 0001
//! os-linux        -> 10
//! ```
//!
//! Allocation is split into [`PrefixTables::plan`], which only reads, and
//! [`PrefixTables::commit`], so a failure at a deeper level never leaves a
//! half-bound category or branch behind.

use crate::error::{GaiaError, Level, Result};
use crate::model::NAME_SEP;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Binds name segments (or segment pairs) of one level to short codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixMap(BTreeMap<String, String>);

impl PrefixMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn bind(&mut self, key: String, code: String) {
        self.0.insert(key, code);
    }

    pub fn unbind(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn codes(&self) -> HashSet<&str> {
        self.0.values().map(String::as_str).collect()
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
}

impl FromIterator<(String, String)> for PrefixMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The category and branch prefix maps. Leaf codes need no table: a leaf is
/// free when no stored entry carries the full id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrefixTables {
    pub(crate) category_id_map: PrefixMap,
    pub(crate) branch_id_map: PrefixMap,
}

/// The outcome of planning an allocation: the id plus the bindings it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: String,
    new_category: Option<(String, String)>,
    new_branch: Option<(String, String)>,
}

impl PrefixTables {
    pub fn new(category_id_map: PrefixMap, branch_id_map: PrefixMap) -> Self {
        Self {
            category_id_map,
            branch_id_map,
        }
    }

    pub fn categories(&self) -> &PrefixMap {
        &self.category_id_map
    }

    pub fn branches(&self) -> &PrefixMap {
        &self.branch_id_map
    }

    /// Works out the id for `name` without touching any table.
    ///
    /// `id_taken` reports whether a full id is already used by a stored entry.
    pub fn plan<F>(&self, name: &str, id_taken: F) -> Result<Allocation>
    where
        F: Fn(&str) -> bool,
    {
        let parts: Vec<&str> = name.split(NAME_SEP).collect();
        let category = parts[0];

        let (category_code, new_category) = match self.category_id_map.get(category) {
            Some(code) => (code.to_string(), None),
            None => {
                let used = self.category_id_map.codes();
                let code = (0..Level::Category.capacity())
                    .map(|i| format!("{:x}", i))
                    .find(|c| !used.contains(c.as_str()))
                    .ok_or(GaiaError::NamespaceExhausted(Level::Category))?;
                (code.clone(), Some((category.to_string(), code)))
            }
        };

        if parts.len() == 1 {
            return Ok(Allocation {
                id: category_code,
                new_category,
                new_branch: None,
            });
        }

        let branch = format!("{}-{}", category, parts[1]);
        let bound = self
            .branch_id_map
            .get(&branch)
            .filter(|code| code.len() == 2 && code.starts_with(category_code.as_str()));

        let (branch_code, new_branch) = match bound {
            Some(code) => (code.to_string(), None),
            None => {
                if self.branch_id_map.get(&branch).is_some() {
                    tracing::debug!(%branch, %category_code, "rebinding stale branch code");
                }
                let used = self.branch_id_map.codes();
                let code = (0..Level::Branch.capacity())
                    .map(|i| format!("{}{:x}", category_code, i))
                    .find(|c| !used.contains(c.as_str()))
                    .ok_or(GaiaError::NamespaceExhausted(Level::Branch))?;
                (code.clone(), Some((branch, code)))
            }
        };

        if parts.len() == 2 {
            return Ok(Allocation {
                id: branch_code,
                new_category,
                new_branch,
            });
        }

        let id = (0..Level::Leaf.capacity())
            .map(|i| format!("{}{:02x}", branch_code, i))
            .find(|candidate| !id_taken(candidate))
            .ok_or(GaiaError::NamespaceExhausted(Level::Leaf))?;

        Ok(Allocation {
            id,
            new_category,
            new_branch,
        })
    }

    /// Binds whatever the allocation planned to bind.
    pub fn commit(&mut self, allocation: &Allocation) {
        if let Some((category, code)) = &allocation.new_category {
            tracing::debug!(%category, %code, "bound category code");
            self.category_id_map.bind(category.clone(), code.clone());
        }
        if let Some((branch, code)) = &allocation.new_branch {
            tracing::debug!(%branch, %code, "bound branch code");
            self.branch_id_map.bind(branch.clone(), code.clone());
        }
    }

    pub fn allocate<F>(&mut self, name: &str, id_taken: F) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        let allocation = self.plan(name, id_taken)?;
        self.commit(&allocation);
        Ok(allocation.id)
    }

    /// Frees a category code once nothing lives under the category anymore.
    ///
    /// Branch codes stay bound: their code space is only compacted by a full
    /// reorganization.
    pub fn reclaim_category(&mut self, category: &str) -> Option<String> {
        let freed = self.category_id_map.unbind(category);
        if let Some(code) = &freed {
            tracing::debug!(%category, %code, "reclaimed category code");
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_taken(_: &str) -> bool {
        false
    }

    #[test]
    fn test_id_length_follows_depth() {
        let mut tables = PrefixTables::default();
        assert_eq!(tables.allocate("lang", never_taken).unwrap(), "0");
        assert_eq!(tables.allocate("lang-go", never_taken).unwrap(), "00");
        assert_eq!(tables.allocate("lang-go-sort", never_taken).unwrap(), "0000");
        assert_eq!(
            tables.allocate("lang-go-sort-quick", never_taken).unwrap().len(),
            4
        );
    }

    #[test]
    fn test_categories_take_first_free_digit() {
        let mut tables = PrefixTables::default();
        assert_eq!(tables.allocate("self", never_taken).unwrap(), "0");
        assert_eq!(tables.allocate("math", never_taken).unwrap(), "1");
        tables.reclaim_category("self");
        assert_eq!(tables.allocate("db", never_taken).unwrap(), "0");
        assert_eq!(tables.allocate("math-linear", never_taken).unwrap(), "10");
    }

    #[test]
    fn test_leaf_skips_taken_ids() {
        let mut tables = PrefixTables::default();
        let taken = |id: &str| id == "0000" || id == "0001";
        assert_eq!(tables.allocate("lang-go-sort", taken).unwrap(), "0002");
    }

    #[test]
    fn test_category_exhaustion() {
        let mut tables = PrefixTables::default();
        for i in 0..16 {
            tables.allocate(&format!("c{}", i), never_taken).unwrap();
        }
        assert!(matches!(
            tables.allocate("c16", never_taken),
            Err(GaiaError::NamespaceExhausted(Level::Category))
        ));
    }

    #[test]
    fn test_branch_exhaustion_binds_nothing() {
        let mut tables = PrefixTables::default();
        for i in 0..16 {
            tables.allocate(&format!("lang-b{}", i), never_taken).unwrap();
        }
        let before = tables.clone();
        assert!(matches!(
            tables.allocate("lang-extra-x", never_taken),
            Err(GaiaError::NamespaceExhausted(Level::Branch))
        ));
        assert_eq!(tables, before);
    }

    #[test]
    fn test_leaf_exhaustion_binds_nothing() {
        let mut tables = PrefixTables::default();
        let err = tables.allocate("fresh-branch-leaf", |_| true).unwrap_err();
        assert!(matches!(err, GaiaError::NamespaceExhausted(Level::Leaf)));
        assert!(tables.categories().is_empty());
        assert!(tables.branches().is_empty());
    }

    #[test]
    fn test_branch_codes_are_not_reclaimed() {
        let mut tables = PrefixTables::default();
        tables.allocate("lang-go", never_taken).unwrap();
        tables.reclaim_category("lang");
        assert_eq!(tables.branches().get("lang-go"), Some("00"));

        // A new category reusing code 0 cannot reuse the stale branch code.
        assert_eq!(tables.allocate("os-linux", never_taken).unwrap(), "01");
    }

    #[test]
    fn test_stale_branch_is_rebound_under_new_category_code() {
        let mut tables = PrefixTables::default();
        tables.allocate("lang-go", never_taken).unwrap();
        tables.reclaim_category("lang");
        tables.allocate("os", never_taken).unwrap();

        let id = tables.allocate("lang-go-sort", never_taken).unwrap();
        assert_eq!(id, "1000");
        assert_eq!(tables.branches().get("lang-go"), Some("10"));
    }
}
