//! Flat text backend.
//!
//! One entry per line, free-text fields base64 encoded so they can hold pipes
//! and newlines:
//!
//! ```text
//! id|name|tags|b64(desc)|b64(content)|executable|b64(execfile)
//! ```
//!
//! Aliases live in a second file, one `from|to` pair per line.
//!
//! Ids are content addressed: the unpadded base64 of a SHA-1 digest over
//! `name|tags` as they were when the entry was added. They stay stable across
//! updates. Adding an entry whose content matches an existing one is refused.

use super::backend::{FsBackend, StorageBackend};
use super::NamespaceStore;
use crate::alias::AliasMap;
use crate::error::{GaiaError, Result};
use crate::model::{category_of, split_tags, Entry, Stats};
use crate::namespace::index::NamespaceIndex;
use crate::namespace::FormatReport;
use crate::search::SearchQuery;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use sha1::{Digest, Sha1};

const FIELD_SEP: char = '|';
const ENTRY_FIELDS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FlatState {
    aliases: AliasMap,
    index: NamespaceIndex,
}

pub struct FlatStore<B: StorageBackend> {
    state: FlatState,
    pub(crate) entries: B,
    pub(crate) aliases: B,
}

pub type FlatFileStore = FlatStore<FsBackend>;

/// Derives the id of a new entry from its name and tags.
pub fn content_id(name: &str, tags: &str) -> String {
    let digest = Sha1::digest(format!("{}{}{}", name, FIELD_SEP, tags).as_bytes());
    STANDARD_NO_PAD.encode(digest)
}

pub fn encode_entry(entry: &Entry) -> String {
    [
        entry.id.clone(),
        entry.name.clone(),
        entry.tags_string(),
        STANDARD.encode(&entry.desc),
        STANDARD.encode(&entry.content),
        entry.executable.to_string(),
        STANDARD.encode(&entry.exec_file),
    ]
    .join(&FIELD_SEP.to_string())
}

pub fn decode_entry(line: &str) -> Result<Entry> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != ENTRY_FIELDS {
        return Err(GaiaError::Decode(format!(
            "expected {} fields, found {}",
            ENTRY_FIELDS,
            fields.len()
        )));
    }
    let text = |field: &str, what: &str| -> Result<String> {
        let bytes = STANDARD
            .decode(field.trim())
            .map_err(|e| GaiaError::Decode(format!("{}: {}", what, e)))?;
        String::from_utf8(bytes).map_err(|e| GaiaError::Decode(format!("{}: {}", what, e)))
    };

    let id = fields[0].trim().to_string();
    let name = fields[1].trim().to_string();
    if id.is_empty() || name.is_empty() {
        return Err(GaiaError::Decode("empty id or name".to_string()));
    }
    Ok(Entry {
        category: category_of(&name).to_string(),
        id,
        name,
        tags: split_tags(fields[2]),
        desc: text(fields[3], "desc")?,
        content: text(fields[4], "content")?,
        executable: fields[5].trim() == "true",
        exec_file: text(fields[6], "execfile")?,
        attachments: Vec::new(),
    })
}

fn decode_alias(line: &str) -> Result<(String, String)> {
    match line.split_once(FIELD_SEP) {
        Some((from, to)) if !to.contains(FIELD_SEP) => Ok((from.to_string(), to.to_string())),
        _ => Err(GaiaError::Decode(format!("malformed alias line '{}'", line))),
    }
}

fn numbered_lines(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    raw.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

impl<B: StorageBackend> FlatStore<B> {
    /// Loads both files, writing a backup of each first. Lines that fail to
    /// decode are skipped with a warning.
    pub fn open(entries: B, aliases: B) -> Result<Self> {
        let mut state = FlatState::default();

        if let Some(raw) = aliases.load()? {
            aliases.backup(&raw)?;
            let pairs = numbered_lines(&raw).filter_map(|(n, line)| match decode_alias(line) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    tracing::warn!(line = n, error = %e, "skipping alias");
                    None
                }
            });
            state.aliases = pairs.collect();
        }

        if let Some(raw) = entries.load()? {
            entries.backup(&raw)?;
            for (n, line) in numbered_lines(&raw) {
                match decode_entry(line) {
                    Ok(entry) => {
                        let id = entry.id.clone();
                        if !state.index.insert(entry) {
                            tracing::warn!(line = n, %id, "skipping entry with duplicated name or id");
                        }
                    }
                    Err(e) => tracing::warn!(line = n, error = %e, "skipping entry"),
                }
            }
        }

        tracing::debug!(entries = state.index.len(), "loaded flat store");
        Ok(Self {
            state,
            entries,
            aliases,
        })
    }

    fn save(&self, state: &FlatState) -> Result<()> {
        let mut lines: Vec<String> = state.index.entries().map(encode_entry).collect();
        lines.push(String::new());
        self.entries.save(&lines.join("\n"))?;

        let mut pairs: Vec<String> = state
            .aliases
            .iter()
            .map(|(from, to)| format!("{}{}{}", from, FIELD_SEP, to))
            .collect();
        pairs.push(String::new());
        self.aliases.save(&pairs.join("\n"))
    }

    fn mutate<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut FlatState) -> Result<T>,
    {
        let mut next = self.state.clone();
        let out = op(&mut next)?;
        self.save(&next)?;
        self.state = next;
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.state.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.index.is_empty()
    }
}

impl FlatState {
    fn insert_new(&mut self, mut entry: Entry) -> Result<String> {
        entry.id = content_id(&entry.name, &entry.tags_string());
        if self.index.contains_id(&entry.id) {
            return Err(GaiaError::DuplicateId(entry.id));
        }
        let id = entry.id.clone();
        self.index.insert(entry);
        Ok(id)
    }
}

impl FlatStore<FsBackend> {
    pub fn at(entries: impl Into<std::path::PathBuf>, aliases: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::open(FsBackend::new(entries), FsBackend::new(aliases))
    }
}

impl<B: StorageBackend> NamespaceStore for FlatStore<B> {
    fn add(&mut self, mut entry: Entry) -> Result<String> {
        if !entry.id.trim().is_empty() {
            return Err(GaiaError::Api(format!(
                "new entries must not carry an id (got '{}')",
                entry.id
            )));
        }
        self.mutate(|state| {
            state.aliases.normalize_entry(&mut entry)?;
            if state.index.id_of(&entry.name).is_some() {
                return Err(GaiaError::NameConflict(entry.name));
            }
            if !entry.content.is_empty() {
                if let Some(dup) = state.index.entries().find(|e| e.content == entry.content) {
                    return Err(GaiaError::DuplicateContent(dup.id.clone()));
                }
            }
            state.insert_new(entry)
        })
    }

    fn update(&mut self, mut entry: Entry) -> Result<()> {
        self.mutate(|state| {
            state.aliases.normalize_entry(&mut entry)?;
            state.index.check_update(&entry)?;
            state.index.replace(entry);
            Ok(())
        })
    }

    fn append(&mut self, id: &str, extra: &str) -> Result<()> {
        let mut entry = self.get_by_id(id)?;
        entry.append_content(extra);
        self.mutate(|state| {
            state.index.replace(entry);
            Ok(())
        })
    }

    fn remove(&mut self, id: &str) -> Result<Entry> {
        self.mutate(|state| {
            state
                .index
                .remove(id.trim())
                .ok_or_else(|| GaiaError::NotFound(id.to_string()))
        })
    }

    fn get_by_id(&self, id: &str) -> Result<Entry> {
        self.state
            .index
            .get(id.trim())
            .cloned()
            .ok_or_else(|| GaiaError::NotFound(id.to_string()))
    }

    fn search(&self, category: &str, keywords: &[String]) -> Result<Vec<Entry>> {
        let query = SearchQuery::new(&self.state.aliases, category, keywords);
        Ok(query
            .filter(self.state.index.entries())
            .into_iter()
            .cloned()
            .collect())
    }

    fn list_by_name_prefix(&self, names: &[String]) -> Result<Vec<Entry>> {
        let prefix = self.name_prefix(names);
        Ok(self
            .state
            .index
            .list_by_prefix(&prefix)
            .into_iter()
            .cloned()
            .collect())
    }

    fn name_prefix(&self, names: &[String]) -> String {
        self.state.aliases.normalize_prefix(names)
    }

    fn get_alias(&self) -> Result<AliasMap> {
        Ok(self.state.aliases.clone())
    }

    fn add_alias(&mut self, from: &str, to: &str) -> Result<()> {
        self.mutate(|state| state.aliases.add(from, to))
    }

    fn remove_alias(&mut self, keyword: &str) -> Result<bool> {
        if self.state.aliases.get(keyword).is_none() {
            return Ok(false);
        }
        self.mutate(|state| Ok(state.aliases.remove(keyword)))
    }

    /// Re-normalizes every entry. A changed name gets a fresh content id.
    fn format_data(&mut self) -> Result<FormatReport> {
        self.mutate(|state| {
            state.aliases.tidy();
            let mut report = FormatReport::default();
            let stored: Vec<Entry> = state.index.entries().cloned().collect();

            for entry in stored {
                let mut normalized = entry.clone();
                if let Err(e) = state.aliases.normalize_entry(&mut normalized) {
                    tracing::warn!(id = %entry.id, error = %e, "cannot normalize entry");
                    report.conflicts.push(entry.name);
                    continue;
                }
                if normalized == entry {
                    continue;
                }
                if normalized.name == entry.name {
                    state.index.replace(normalized);
                    report.updated += 1;
                    continue;
                }
                let new_id = content_id(&normalized.name, &normalized.tags_string());
                if state.index.id_of(&normalized.name).is_some() || state.index.contains_id(&new_id) {
                    tracing::warn!(id = %entry.id, name = %normalized.name, "normalized name already taken");
                    report.conflicts.push(entry.name);
                    continue;
                }
                state.index.remove(&entry.id);
                let name = normalized.name.clone();
                let new_id = state.insert_new(normalized)?;
                report.renamed.push((entry.id, new_id, name));
            }

            tracing::info!(
                updated = report.updated,
                renamed = report.renamed.len(),
                conflicts = report.conflicts.len(),
                "formatted flat store"
            );
            Ok(report)
        })
    }

    fn get_stats(&self) -> Result<Stats> {
        Ok(Stats::from_entries(self.state.index.entries()))
    }
}
