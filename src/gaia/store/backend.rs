use crate::error::{GaiaError, Result};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Raw document I/O for one stored file.
/// This trait handles the "how" of storage (filesystem vs memory), while the
/// stores handle the "what" (encoding, namespace rules).
pub trait StorageBackend {
    /// Reads the whole document. `Ok(None)` when it does not exist yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the whole document.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, content: &str) -> Result<()>;

    /// Keeps a copy of a previously loaded document next to it.
    fn backup(&self, content: &str) -> Result<()>;
}

pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bk");
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(GaiaError::Io)?;
            }
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(GaiaError::Io)?;
        let lines: Vec<String> = bytes
            .split(|b| *b == b'\n')
            .enumerate()
            .map(|(n, line)| match std::str::from_utf8(line) {
                Ok(text) => text.to_string(),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = n + 1,
                        error = %e,
                        "replacing invalid UTF-8"
                    );
                    String::from_utf8_lossy(line).into_owned()
                }
            })
            .collect();
        Ok(Some(lines.join("\n")))
    }

    fn save(&self, content: &str) -> Result<()> {
        self.ensure_parent()?;
        let stem = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_file = self
            .path
            .with_file_name(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(GaiaError::Io)?;
        fs::rename(&tmp_file, &self.path).map_err(GaiaError::Io)?;
        Ok(())
    }

    fn backup(&self, content: &str) -> Result<()> {
        let path = self.backup_path();
        fs::write(&path, content).map_err(GaiaError::Io)?;
        tracing::info!(path = %path.display(), "wrote backup");
        Ok(())
    }
}

/// In-memory backend for testing.
///
/// Uses `RefCell` so the trait can take `&self`, as the file backend does.
#[derive(Default)]
pub struct MemBackend {
    content: RefCell<Option<String>>,
    backup: RefCell<Option<String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing document, as if read from disk.
    pub fn with_content(content: impl Into<String>) -> Self {
        let backend = Self::default();
        *backend.content.borrow_mut() = Some(content.into());
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    pub fn backup_content(&self) -> Option<String> {
        self.backup.borrow().clone()
    }
}

impl StorageBackend for MemBackend {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.content.borrow().clone())
    }

    fn save(&self, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(GaiaError::Store("Simulated write error".to_string()));
        }
        *self.content.borrow_mut() = Some(content.to_string());
        Ok(())
    }

    fn backup(&self, content: &str) -> Result<()> {
        *self.backup.borrow_mut() = Some(content.to_string());
        Ok(())
    }
}
