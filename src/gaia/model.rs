use crate::error::{GaiaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Separator between name segments.
pub const NAME_SEP: char = '-';
/// Separator between tags in their stored form.
pub const TAG_SEP: char = ',';

/// One stored unit of the knowledge base.
///
/// Field names follow the persisted JSON layout (`Id`, `Name`, `Tags`...), and
/// tags are stored as a single comma separated string for compatibility with
/// existing data files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(with = "tags_csv")]
    pub tags: Vec<String>,
    pub desc: String,
    pub content: String,
    pub executable: bool,
    pub exec_file: String,
    pub attachments: Vec<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            category: category_of(&name).to_string(),
            name,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split(NAME_SEP)
    }

    /// The category + second segment, or just the category for one-segment names.
    pub fn branch(&self) -> String {
        branch_of(&self.name)
    }

    /// Adds text below the current content, separated by a blank line.
    pub fn append_content(&mut self, extra: &str) {
        self.content = format!("{}\n\n{}", self.content.trim(), extra.trim());
    }

    pub fn tags_string(&self) -> String {
        self.tags.join(",")
    }

    /// Name segments after the category, plus the tags.
    pub fn keywords(&self) -> BTreeSet<&str> {
        self.segments()
            .skip(1)
            .chain(self.tags.iter().map(String::as_str))
            .collect()
    }
}

pub fn category_of(name: &str) -> &str {
    name.split(NAME_SEP).next().unwrap_or_default()
}

pub fn branch_of(name: &str) -> String {
    name.split(NAME_SEP).take(2).collect::<Vec<_>>().join("-")
}

/// Whether `name` is `prefix` itself or lies below it on a segment boundary.
pub fn name_has_prefix(name: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || name == prefix
        || name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(NAME_SEP))
}

/// A normalized name is non-empty, has no empty segments, and holds no
/// whitespace or field separators.
pub fn validate_name(name: &str) -> Result<()> {
    let bad_char = name
        .chars()
        .any(|c| c == '|' || c == TAG_SEP || c.is_whitespace());
    if name.is_empty() || bad_char || name.split(NAME_SEP).any(str::is_empty) {
        return Err(GaiaError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Per-category figures reported by `stats` and `list --categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub entries: usize,
    pub tags: BTreeSet<String>,
}

/// Per-tag figures reported by `stats` and `list --tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagStats {
    pub entries: usize,
    pub categories: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub entries: usize,
    pub categories: BTreeMap<String, CategoryStats>,
    pub tags: BTreeMap<String, TagStats>,
}

impl Stats {
    pub fn from_entries<'a, I: IntoIterator<Item = &'a Entry>>(entries: I) -> Self {
        let mut stats = Stats::default();
        for entry in entries {
            stats.entries += 1;
            let cate = stats.categories.entry(entry.category.clone()).or_default();
            cate.entries += 1;
            for tag in &entry.tags {
                cate.tags.insert(tag.clone());
                let t = stats.tags.entry(tag.clone()).or_default();
                t.entries += 1;
                t.categories.insert(entry.category.clone());
            }
        }
        stats
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

mod tags_csv {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&tags.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(super::split_tags(&raw))
    }
}

/// Splits a comma separated tag string, dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_SEP)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
