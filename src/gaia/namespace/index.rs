use crate::error::{GaiaError, Result};
use crate::model::{category_of, name_has_prefix, Entry};
use serde::Serialize;
use std::collections::BTreeMap;

/// The live collection: `Name -> Id` and `Id -> Entry`, kept in step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamespaceIndex {
    name_id_map: BTreeMap<String, String>,
    node_map: BTreeMap<String, Entry>,
}

impl NamespaceIndex {
    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.name_id_map.get(name).map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.node_map.get(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Inserts an entry that already carries its id.
    ///
    /// Returns false (and inserts nothing) when the id or the name is taken.
    pub fn insert(&mut self, entry: Entry) -> bool {
        if self.node_map.contains_key(&entry.id) || self.name_id_map.contains_key(&entry.name) {
            return false;
        }
        self.name_id_map.insert(entry.name.clone(), entry.id.clone());
        self.node_map.insert(entry.id.clone(), entry);
        true
    }

    /// Checks that `entry` may replace the stored entry carrying its id: the
    /// id must exist and the name must stay the same.
    pub fn check_update(&self, entry: &Entry) -> Result<()> {
        let stored = self
            .get(&entry.id)
            .ok_or_else(|| GaiaError::NotFound(entry.id.clone()))?;

        if stored.branch() != entry.branch() {
            return Err(GaiaError::BranchChanged {
                id: entry.id.clone(),
                from: stored.branch(),
                to: entry.branch(),
            });
        }
        if stored.name != entry.name {
            return Err(GaiaError::Api(format!(
                "cannot rename '{}' to '{}' through update; remove and re-add it",
                stored.name, entry.name
            )));
        }
        Ok(())
    }

    /// Replaces the payload of an existing entry. The name must not change.
    pub fn replace(&mut self, entry: Entry) -> Option<Entry> {
        match self.node_map.get_mut(&entry.id) {
            Some(slot) if slot.name == entry.name => Some(std::mem::replace(slot, entry)),
            _ => None,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let entry = self.node_map.remove(id)?;
        self.name_id_map.remove(&entry.name);
        Some(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.node_map.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.node_map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.name_id_map.keys().any(|n| category_of(n) == category)
    }

    pub fn list_by_prefix(&self, prefix: &str) -> Vec<&Entry> {
        self.name_id_map
            .iter()
            .filter(|(name, _)| name_has_prefix(name, prefix))
            .filter_map(|(_, id)| self.node_map.get(id))
            .collect()
    }
}
