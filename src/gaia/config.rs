use crate::error::{GaiaError, Result};
use crate::store::StoreKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DATA_DIRNAME: &str = "data";
const HOME_DIRNAME: &str = ".gaia";
const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_TREE_DEPTH: usize = 8;
pub const MIN_TREE_DEPTH: usize = 2;

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "GAIA_HOME";

/// Configuration for gaia, stored in `<home>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GaiaConfig {
    /// Storage backend for the knowledge base
    #[serde(default)]
    pub backend: StoreKind,

    /// Maximum number of entries printed by `search`
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Default maximum depth of `list` trees
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,

    /// Editor command, overriding $EDITOR / $VISUAL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_tree_depth() -> usize {
    DEFAULT_TREE_DEPTH
}

impl Default for GaiaConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            tree_depth: DEFAULT_TREE_DEPTH,
            editor: None,
        }
    }
}

impl GaiaConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(GaiaError::Io)?;
        let mut config: GaiaConfig =
            serde_json::from_str(&content).map_err(GaiaError::Serialization)?;
        config.tree_depth = config.tree_depth.max(MIN_TREE_DEPTH);
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(GaiaError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(GaiaError::Serialization)?;
        fs::write(config_path, content).map_err(GaiaError::Io)?;
        Ok(())
    }

    pub const KEYS: [&'static str; 4] = ["backend", "search-limit", "tree-depth", "editor"];

    /// Reads a setting by its command-line key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "backend" => Some(self.backend.to_string()),
            "search-limit" => Some(self.search_limit.to_string()),
            "tree-depth" => Some(self.tree_depth.to_string()),
            "editor" => Some(self.editor.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Sets a setting by its command-line key. An empty editor clears it.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "backend" => {
                self.backend = value.parse().map_err(|e: GaiaError| e.to_string())?;
            }
            "search-limit" => {
                self.search_limit = parse_count(key, value)?;
            }
            "tree-depth" => {
                self.tree_depth = parse_count(key, value)?.max(MIN_TREE_DEPTH);
            }
            "editor" => {
                let value = value.trim();
                self.editor = (!value.is_empty()).then(|| value.to_string());
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> std::result::Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} must be a positive number, got '{}'", key, value)),
    }
}

/// Where a gaia home keeps its files.
#[derive(Debug, Clone)]
pub struct GaiaPaths {
    pub home: PathBuf,
}

impl GaiaPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// `$GAIA_HOME` when set, otherwise `~/.gaia`.
    pub fn discover() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(home));
        }
        let base = directories::BaseDirs::new()
            .ok_or_else(|| GaiaError::Store("Cannot determine the home directory".to_string()))?;
        Ok(Self::new(base.home_dir().join(HOME_DIRNAME)))
    }

    pub fn config_dir(&self) -> &Path {
        &self.home
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home.join(DATA_DIRNAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GaiaConfig::default();
        assert_eq!(config.backend, StoreKind::Json);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.tree_depth, 8);
        assert!(config.editor.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = GaiaConfig::load(dir.path().join("absent")).unwrap();
        assert_eq!(config, GaiaConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = GaiaConfig::default();
        config.set("backend", "flat").unwrap();
        config.set("editor", "nano").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = GaiaConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.backend, StoreKind::Flat);
        assert_eq!(loaded.editor.as_deref(), Some("nano"));
    }

    #[test]
    fn test_partial_file_uses_defaults_and_clamps_depth() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"tree_depth": 1}"#).unwrap();
        let config = GaiaConfig::load(dir.path()).unwrap();
        assert_eq!(config.tree_depth, 2);
        assert_eq!(config.search_limit, 10);
    }

    #[test]
    fn test_get_and_set_by_key() {
        let mut config = GaiaConfig::default();
        for key in GaiaConfig::KEYS {
            assert!(config.get(key).is_some(), "{}", key);
        }
        assert!(config.get("color").is_none());

        config.set("search-limit", "25").unwrap();
        assert_eq!(config.get("search-limit").as_deref(), Some("25"));
        assert!(config.set("search-limit", "0").is_err());
        assert!(config.set("backend", "sqlite").is_err());
        assert!(config.set("color", "on").is_err());

        config.set("tree-depth", "1").unwrap();
        assert_eq!(config.tree_depth, 2);
        config.set("editor", " ").unwrap();
        assert!(config.editor.is_none());
    }

    #[test]
    fn test_paths_layout() {
        let paths = GaiaPaths::new("/tmp/gaia-home");
        assert_eq!(paths.config_dir(), Path::new("/tmp/gaia-home"));
        assert_eq!(paths.data_dir(), PathBuf::from("/tmp/gaia-home/data"));
    }
}
