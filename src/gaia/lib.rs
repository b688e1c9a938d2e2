//! # Gaia Architecture
//!
//! Gaia is a personal knowledge base: short snippets of text filed under
//! hierarchical, dash separated names such as `lang-go-sort`, each carrying a
//! compact hexadecimal id that mirrors its place in the hierarchy.
//!
//! Like any gaia client, the command line tool is a thin layer over the library.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Applies configured limits, trims ids                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One function per operation, returns CmdResult            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - NamespaceStore trait                                     │
//! │  - JSON document store and flat pipe-delimited store        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Namespace core (namespace/, alias.rs, search.rs, tree.rs)  │
//! │  - Alias normalization, id allocation, the name index       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ids
//!
//! An id is built from hex digits: one for the category, one for the branch
//! within the category, and the rest for the entry. `lang-go-sort` might be
//! `0100`: category `lang` is `0`, branch `lang-go` is `1`, and `00` is the
//! first leaf under that branch. Names with one or two segments stop early
//! (`1` for a bare category, `10` for a two segment name). See
//! [`namespace::allocator`].
//!
//! ## Aliases
//!
//! Aliases map a keyword to its canonical spelling (`golang` to `go`). They
//! are applied to every name segment and tag on the way in, and to search
//! keywords, so `lang-golang-sort` and `lang-go-sort` are the same entry.
//!
//! ## Module Overview
//!
//! - **[`api`]**: Facade used by the CLI
//! - **[`commands`]**: Business logic
//! - **[`store`]**: Persistence backends
//! - **[`namespace`]**: Index and id allocation
//! - **[`alias`]**, **[`search`]**, **[`tree`]**: Normalization, matching, display
//! - **[`model`]**: `Entry` and statistics types
//! - **[`config`]**, **[`editor`]**, **[`error`]**: Ambient support

pub mod alias;
pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod namespace;
pub mod search;
pub mod store;
pub mod tree;
