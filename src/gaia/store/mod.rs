//! # Storage Layer
//!
//! The [`NamespaceStore`] trait is the contract every command works against.
//! Two implementations exist, chosen at construction time through [`Backend`]:
//!
//! - [`json::JsonStore`]: the whole [`Namespace`](crate::namespace::Namespace)
//!   as one JSON document, with hierarchical hex ids.
//! - [`flat::FlatStore`]: one pipe-delimited line per entry, content-addressed
//!   ids, duplicate content rejected.
//!
//! Both are generic over a [`StorageBackend`], which only knows how to read,
//! atomically replace and back up a whole document. [`FsBackend`] does that on
//! disk, [`MemBackend`] in memory for tests.
//!
//! ## Load, Mutate, Save
//!
//! A store loads everything when opened and writes a `.bk` copy of what it
//! read. Each mutation runs against a copy of the in-memory state; only when
//! the new state has been saved does it replace the old one. A failed save
//! fails the operation and leaves the store as it was.
//!
//! There is no locking: two processes writing the same home directory at the
//! same time will lose one of the writes.
//!
//! ## Storage Layout
//!
//! ```text
//! <home>/data/
//! ├── data.json        # JSON backend
//! ├── data.json.bk
//! ├── entries.txt      # flat backend: id|name|tags|desc|content|executable|execfile
//! ├── entries.txt.bk
//! ├── aliases.txt      # flat backend: from|to
//! └── aliases.txt.bk
//! ```

use crate::alias::AliasMap;
use crate::error::{GaiaError, Result};
use crate::model::{Entry, Stats};
use crate::namespace::{FormatReport, ReorgReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod backend;
pub mod flat;
pub mod json;

pub use backend::{FsBackend, MemBackend, StorageBackend};
pub use flat::FlatFileStore;
pub use json::{InMemoryStore, JsonFileStore};

pub const JSON_FILE: &str = "data.json";
pub const ENTRIES_FILE: &str = "entries.txt";
pub const ALIASES_FILE: &str = "aliases.txt";

/// Abstract interface for namespace storage.
///
/// Every mutation either fully succeeds (and is persisted) or leaves the
/// store unchanged.
pub trait NamespaceStore {
    /// Adds a new entry (its id must be empty) and returns the assigned id.
    fn add(&mut self, entry: Entry) -> Result<String>;

    /// Replaces the payload of an existing entry; the name may not change.
    fn update(&mut self, entry: Entry) -> Result<()>;

    /// Appends text to an entry's content after a blank line.
    fn append(&mut self, id: &str, extra: &str) -> Result<()>;

    /// Removes an entry and returns it.
    fn remove(&mut self, id: &str) -> Result<Entry>;

    fn get_by_id(&self, id: &str) -> Result<Entry>;

    /// Entries of `category` (any, when empty) carrying every keyword.
    fn search(&self, category: &str, keywords: &[String]) -> Result<Vec<Entry>>;

    /// Entries at or below the name formed by joining `names` with dashes.
    fn list_by_name_prefix(&self, names: &[String]) -> Result<Vec<Entry>>;

    /// The normalized form of the prefix `list_by_name_prefix` matches against.
    fn name_prefix(&self, names: &[String]) -> String;

    fn get_alias(&self) -> Result<AliasMap>;

    fn add_alias(&mut self, from: &str, to: &str) -> Result<()>;

    /// Returns false when there was no such alias.
    fn remove_alias(&mut self, keyword: &str) -> Result<bool>;

    /// Re-normalizes every stored name and tag list against the alias map.
    fn format_data(&mut self) -> Result<FormatReport>;

    fn get_stats(&self) -> Result<Stats>;

    /// Reallocates every id from scratch. Not every backend can.
    fn reorganize(&mut self) -> Result<ReorgReport> {
        Err(GaiaError::Store(
            "reorganize is not supported by this backend".to_string(),
        ))
    }
}

/// Which backend a home directory uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Json,
    Flat,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Json => write!(f, "json"),
            StoreKind::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = GaiaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(StoreKind::Json),
            "flat" => Ok(StoreKind::Flat),
            other => Err(GaiaError::Api(format!(
                "unknown backend '{}' (expected json or flat)",
                other
            ))),
        }
    }
}

/// The backend selected at construction time.
pub enum Backend {
    Json(JsonFileStore),
    Flat(FlatFileStore),
}

impl Backend {
    /// Opens the store of the given kind under `data_dir`, creating the
    /// directory when needed.
    pub fn open(kind: StoreKind, data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let store = match kind {
            StoreKind::Json => Backend::Json(JsonFileStore::open(FsBackend::new(
                data_dir.join(JSON_FILE),
            ))?),
            StoreKind::Flat => Backend::Flat(FlatFileStore::open(
                FsBackend::new(data_dir.join(ENTRIES_FILE)),
                FsBackend::new(data_dir.join(ALIASES_FILE)),
            )?),
        };
        tracing::debug!(backend = %kind, dir = %data_dir.display(), "opened store");
        Ok(store)
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Backend::Json(_) => StoreKind::Json,
            Backend::Flat(_) => StoreKind::Flat,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Backend::Json($store) => $call,
            Backend::Flat($store) => $call,
        }
    };
}

impl NamespaceStore for Backend {
    fn add(&mut self, entry: Entry) -> Result<String> {
        delegate!(self, s => s.add(entry))
    }

    fn update(&mut self, entry: Entry) -> Result<()> {
        delegate!(self, s => s.update(entry))
    }

    fn append(&mut self, id: &str, extra: &str) -> Result<()> {
        delegate!(self, s => s.append(id, extra))
    }

    fn remove(&mut self, id: &str) -> Result<Entry> {
        delegate!(self, s => s.remove(id))
    }

    fn get_by_id(&self, id: &str) -> Result<Entry> {
        delegate!(self, s => s.get_by_id(id))
    }

    fn search(&self, category: &str, keywords: &[String]) -> Result<Vec<Entry>> {
        delegate!(self, s => s.search(category, keywords))
    }

    fn list_by_name_prefix(&self, names: &[String]) -> Result<Vec<Entry>> {
        delegate!(self, s => s.list_by_name_prefix(names))
    }

    fn name_prefix(&self, names: &[String]) -> String {
        delegate!(self, s => s.name_prefix(names))
    }

    fn get_alias(&self) -> Result<AliasMap> {
        delegate!(self, s => s.get_alias())
    }

    fn add_alias(&mut self, from: &str, to: &str) -> Result<()> {
        delegate!(self, s => s.add_alias(from, to))
    }

    fn remove_alias(&mut self, keyword: &str) -> Result<bool> {
        delegate!(self, s => s.remove_alias(keyword))
    }

    fn format_data(&mut self) -> Result<FormatReport> {
        delegate!(self, s => s.format_data())
    }

    fn get_stats(&self) -> Result<Stats> {
        delegate!(self, s => s.get_stats())
    }

    fn reorganize(&mut self) -> Result<ReorgReport> {
        delegate!(self, s => s.reorganize())
    }
}
