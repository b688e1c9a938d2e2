//! # Commands
//!
//! One module per user operation. Every command is a function generic over
//! [`NamespaceStore`](crate::store::NamespaceStore) returning
//! `Result<CmdResult>`: the entries it touched or listed, any structured
//! report, and messages for the user. Commands never print.

use crate::config::GaiaConfig;
use crate::model::{CategoryStats, Entry, Stats, TagStats};

pub mod add;
pub mod admin;
pub mod alias;
pub mod append;
pub mod config;
pub mod edit;
pub mod get;
pub mod list;
pub mod merge;
pub mod remove;
pub mod search;
pub mod stats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Entries created, changed, removed or shown in full.
    pub affected_entries: Vec<Entry>,
    /// Entries listed one per line (search results).
    pub listed_entries: Vec<Entry>,
    /// Rendered name tree.
    pub tree_lines: Vec<String>,
    pub stats: Option<Stats>,
    pub categories: Vec<(String, CategoryStats)>,
    pub tags: Vec<(String, TagStats)>,
    pub aliases: Vec<(String, String)>,
    pub config: Option<GaiaConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_entries(mut self, entries: Vec<Entry>) -> Self {
        self.affected_entries = entries;
        self
    }

    pub fn with_listed_entries(mut self, entries: Vec<Entry>) -> Self {
        self.listed_entries = entries;
        self
    }

    pub fn with_tree_lines(mut self, lines: Vec<String>) -> Self {
        self.tree_lines = lines;
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_config(mut self, config: GaiaConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }
}
