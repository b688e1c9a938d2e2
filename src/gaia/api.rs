//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It serves as the
//! single entry point for all gaia operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (e.g., trimming ids, applying configured limits)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and holds no business logic.
//!
//! ## Generic Over NamespaceStore
//!
//! `GaiaApi<S: NamespaceStore>` is generic over the storage backend:
//! - Production: `GaiaApi<Backend>` (JSON or flat, chosen by config)
//! - Testing: `GaiaApi<InMemoryStore>`

use crate::commands;
use crate::config::{GaiaConfig, GaiaPaths, MIN_TREE_DEPTH};
use crate::editor::EntryEditor;
use crate::error::Result;
use crate::model::Entry;
use crate::store::{Backend, NamespaceStore};

/// The main API facade for gaia operations.
pub struct GaiaApi<S: NamespaceStore> {
    store: S,
    paths: GaiaPaths,
    config: GaiaConfig,
}

impl GaiaApi<Backend> {
    /// Opens the store the configuration under `paths` asks for.
    pub fn open(paths: GaiaPaths) -> Result<Self> {
        let config = GaiaConfig::load(paths.config_dir())?;
        let store = Backend::open(config.backend, &paths.data_dir())?;
        Ok(Self::new(store, paths, config))
    }
}

impl<S: NamespaceStore> GaiaApi<S> {
    pub fn new(store: S, paths: GaiaPaths, config: GaiaConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn config(&self) -> &GaiaConfig {
        &self.config
    }

    pub fn add_entry(&mut self, entry: Entry) -> Result<commands::CmdResult> {
        commands::add::run(&mut self.store, entry)
    }

    pub fn get_entry(&self, id: &str) -> Result<commands::CmdResult> {
        commands::get::run(&self.store, id.trim())
    }

    pub fn edit_entry<E: EntryEditor>(
        &mut self,
        id: &str,
        editor: &mut E,
    ) -> Result<commands::CmdResult> {
        commands::edit::run(&mut self.store, id.trim(), editor)
    }

    pub fn append_entry(&mut self, id: &str, text: &str) -> Result<commands::CmdResult> {
        commands::append::run(&mut self.store, id.trim(), text)
    }

    pub fn merge_entries<I: AsRef<str>>(&mut self, ids: &[I]) -> Result<commands::CmdResult> {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_ref().trim()).collect();
        commands::merge::run(&mut self.store, &ids)
    }

    pub fn remove_entry(&mut self, id: &str) -> Result<commands::CmdResult> {
        commands::remove::run(&mut self.store, id.trim())
    }

    pub fn search(&self, category: Option<&str>, keywords: &[String]) -> Result<commands::CmdResult> {
        commands::search::run(
            &self.store,
            category.unwrap_or_default(),
            keywords,
            self.config.search_limit,
        )
    }

    /// Tree view; `depth` falls back to the configured default and is never
    /// shallower than [`MIN_TREE_DEPTH`].
    pub fn list_names(
        &self,
        segments: &[String],
        depth: Option<usize>,
    ) -> Result<commands::CmdResult> {
        let depth = depth.unwrap_or(self.config.tree_depth).max(MIN_TREE_DEPTH);
        commands::list::names(&self.store, segments, Some(depth))
    }

    pub fn list_categories(&self) -> Result<commands::CmdResult> {
        commands::list::categories(&self.store)
    }

    pub fn list_tags(&self) -> Result<commands::CmdResult> {
        commands::list::tags(&self.store)
    }

    pub fn list_aliases(&self) -> Result<commands::CmdResult> {
        commands::list::aliases(&self.store)
    }

    pub fn add_alias(&mut self, from: &str, to: &str) -> Result<commands::CmdResult> {
        commands::alias::add(&mut self.store, from, to)
    }

    pub fn remove_alias(&mut self, keyword: &str) -> Result<commands::CmdResult> {
        commands::alias::remove(&mut self.store, keyword)
    }

    pub fn stats(&self) -> Result<commands::CmdResult> {
        commands::stats::run(&self.store)
    }

    pub fn format_data(&mut self) -> Result<commands::CmdResult> {
        commands::admin::format(&mut self.store)
    }

    pub fn reorganize(&mut self) -> Result<commands::CmdResult> {
        commands::admin::reorganize(&mut self.store)
    }

    pub fn config_cmd(&self, action: commands::config::ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json::fixtures::StoreFixture;
    use crate::store::InMemoryStore;

    fn api_with(store: InMemoryStore, config: GaiaConfig) -> GaiaApi<InMemoryStore> {
        GaiaApi::new(store, GaiaPaths::new("/nonexistent"), config)
    }

    #[test]
    fn search_uses_configured_limit() {
        let config = GaiaConfig {
            search_limit: 1,
            ..Default::default()
        };
        let api = api_with(StoreFixture::sample().store, config);
        let result = api.search(Some("lang"), &[]).unwrap();
        assert_eq!(result.listed_entries.len(), 1);
    }

    #[test]
    fn list_names_uses_configured_depth() {
        let config = GaiaConfig {
            tree_depth: 2,
            ..Default::default()
        };
        let api = api_with(StoreFixture::sample().store, config);
        let result = api.list_names(&[], None).unwrap();
        assert!(!result.tree_lines.iter().any(|l| l.contains("kernel")));

        let result = api.list_names(&[], Some(3)).unwrap();
        assert!(result.tree_lines.iter().any(|l| l.contains("kernel(")));
    }

    #[test]
    fn explicit_depth_is_raised_to_minimum() {
        let api = api_with(StoreFixture::sample().store, GaiaConfig::default());
        let floor = api.list_names(&[], Some(MIN_TREE_DEPTH)).unwrap().tree_lines;
        assert_eq!(api.list_names(&[], Some(0)).unwrap().tree_lines, floor);
        assert_eq!(api.list_names(&[], Some(1)).unwrap().tree_lines, floor);
        assert!(floor.iter().any(|l| l.ends_with("go")));
    }

    #[test]
    fn ids_are_trimmed() {
        let fixture = StoreFixture::sample();
        let id = fixture.id_of("os-linux-kernel");
        let mut api = api_with(fixture.store, GaiaConfig::default());
        assert!(api.get_entry(&format!("{}\n", id)).is_ok());
        assert!(api.remove_entry(&format!(" {}", id)).is_ok());
    }

    #[test]
    fn merge_through_api() {
        let fixture = StoreFixture::sample();
        let a = fixture.id_of("lang-go-sort");
        let b = fixture.id_of("lang-go-search");
        let mut api = api_with(fixture.store, GaiaConfig::default());
        let result = api.merge_entries(&[a, b]).unwrap();
        assert_eq!(result.affected_entries[0].name, "lang-go-sort");
    }
}
