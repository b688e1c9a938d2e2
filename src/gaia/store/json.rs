use super::backend::{FsBackend, MemBackend, StorageBackend};
use super::NamespaceStore;
use crate::alias::AliasMap;
use crate::error::Result;
use crate::model::{Entry, Stats};
use crate::namespace::{FormatReport, Namespace, ReorgReport};
use std::path::PathBuf;

/// Keeps the whole namespace as one JSON document.
pub struct JsonStore<B: StorageBackend> {
    namespace: Namespace,
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

pub type JsonFileStore = JsonStore<FsBackend>;
pub type InMemoryStore = JsonStore<MemBackend>;

impl<B: StorageBackend> JsonStore<B> {
    /// Loads the namespace, writing a backup of the document first.
    pub fn open(backend: B) -> Result<Self> {
        let namespace = match backend.load()? {
            Some(raw) => {
                backend.backup(&raw)?;
                Namespace::from_json(&raw)?
            }
            None => Namespace::new(),
        };
        tracing::debug!(entries = namespace.len(), "loaded namespace");
        Ok(Self { namespace, backend })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Applies `op` to a copy of the namespace and keeps the copy only once
    /// it has been saved.
    fn mutate<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Namespace) -> Result<T>,
    {
        let mut next = self.namespace.clone();
        let out = op(&mut next)?;
        self.backend.save(&next.to_json()?)?;
        self.namespace = next;
        Ok(out)
    }
}

impl JsonStore<FsBackend> {
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(FsBackend::new(path))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            namespace: Namespace::new(),
            backend: MemBackend::new(),
        }
    }
}

impl<B: StorageBackend> NamespaceStore for JsonStore<B> {
    fn add(&mut self, entry: Entry) -> Result<String> {
        self.mutate(|ns| ns.add(entry))
    }

    fn update(&mut self, entry: Entry) -> Result<()> {
        self.mutate(|ns| ns.update(entry))
    }

    fn append(&mut self, id: &str, extra: &str) -> Result<()> {
        self.mutate(|ns| ns.append(id, extra))
    }

    fn remove(&mut self, id: &str) -> Result<Entry> {
        self.mutate(|ns| ns.remove(id))
    }

    fn get_by_id(&self, id: &str) -> Result<Entry> {
        self.namespace.get(id).cloned()
    }

    fn search(&self, category: &str, keywords: &[String]) -> Result<Vec<Entry>> {
        Ok(self.namespace.search(category, keywords))
    }

    fn list_by_name_prefix(&self, names: &[String]) -> Result<Vec<Entry>> {
        Ok(self.namespace.list_by_name_prefix(names))
    }

    fn name_prefix(&self, names: &[String]) -> String {
        self.namespace.normalize_prefix(names)
    }

    fn get_alias(&self) -> Result<AliasMap> {
        Ok(self.namespace.aliases().clone())
    }

    fn add_alias(&mut self, from: &str, to: &str) -> Result<()> {
        self.mutate(|ns| ns.add_alias(from, to))
    }

    fn remove_alias(&mut self, keyword: &str) -> Result<bool> {
        if self.namespace.aliases().get(keyword).is_none() {
            return Ok(false);
        }
        self.mutate(|ns| Ok(ns.remove_alias(keyword)))
    }

    fn format_data(&mut self) -> Result<FormatReport> {
        self.mutate(|ns| ns.format_data())
    }

    fn get_stats(&self) -> Result<Stats> {
        Ok(self.namespace.stats())
    }

    fn reorganize(&mut self) -> Result<ReorgReport> {
        self.mutate(|ns| ns.reorganize())
    }
}

// --- Test Fixtures ---

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_entry(mut self, name: &str, tags: &[&str], content: &str) -> Self {
            let entry = Entry::new(name, content).with_tags(tags.iter().copied());
            self.store.add(entry).unwrap();
            self
        }

        pub fn with_alias(mut self, from: &str, to: &str) -> Self {
            self.store.add_alias(from, to).unwrap();
            self
        }

        /// The sample knowledge base most command tests start from.
        pub fn sample() -> Self {
            Self::new()
                .with_alias("golang", "go")
                .with_entry("lang-go-sort", &["algorithm"], "sort.Ints(xs)")
                .with_entry("lang-go-search", &["algorithm"], "sort.Search(n, f)")
                .with_entry("lang-rust-sort", &["algorithm"], "xs.sort()")
                .with_entry("os-linux-kernel", &["uname"], "uname -r")
        }

        pub fn id_of(&self, name: &str) -> String {
            self.store
                .namespace()
                .index()
                .id_of(name)
                .unwrap_or_default()
                .to_string()
        }
    }
}
