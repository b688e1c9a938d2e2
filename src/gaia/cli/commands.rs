//! # CLI Layer
//!
//! This module is **one possible UI client** for gaia. It is the only place
//! that knows about terminal I/O, exit codes and argument parsing.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Locate the gaia home, load config, open the store
//! 3. **API Dispatch**: Call the appropriate `GaiaApi` method
//! 4. **Output Formatting**: Convert `CmdResult` into terminal output
//!
//! Interactive bits live here too: the editor for `add` without a body, and
//! the confirmation prompt before `remove`.

use super::print::{
    print_aliases, print_categories, print_config, print_entries, print_entry_list,
    print_messages, print_stats, print_tags, print_tree,
};
use super::setup::{print_grouped_help, print_help_for_command, Cli, Commands};
use clap::Parser;
use gaia::api::GaiaApi;
use gaia::commands::config::ConfigAction;
use gaia::commands::CmdMessage;
use gaia::config::GaiaPaths;
use gaia::editor::{EntryEditor, ExternalEditor};
use gaia::error::{GaiaError, Result};
use gaia::model::{split_tags, Entry};
use gaia::store::Backend;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding a tracing filter, e.g. `GAIA_LOG=gaia=trace`.
const LOG_ENV: &str = "GAIA_LOG";

#[derive(Default)]
struct AppContext {
    api: Option<GaiaApi<Backend>>,
}

impl AppContext {
    fn api(&mut self) -> Result<&mut GaiaApi<Backend>> {
        match &mut self.api {
            Some(api) => Ok(api),
            slot => Ok(slot.insert(open_api()?)),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let Some(command) = cli.command else {
        print_grouped_help();
        return Ok(());
    };

    // The store is opened on first use, so help never touches the home.
    let mut ctx = AppContext::default();

    match command {
        Commands::Add {
            name,
            tags,
            desc,
            body,
            file,
            executable,
            main,
        } => {
            let draft = AddDraft {
                name,
                tags,
                desc,
                body,
                file,
                executable,
                main,
            };
            handle_add(&mut ctx, draft)
        }
        Commands::Get { id, content } => handle_get(&mut ctx, &id, content),
        Commands::Edit { id } => handle_edit(&mut ctx, &id),
        Commands::Append { id, text } => handle_append(&mut ctx, &id, text),
        Commands::Merge { ids } => handle_merge(&mut ctx, ids),
        Commands::Remove { id, yes } => handle_remove(&mut ctx, &id, yes),
        Commands::Search { category, keywords } => {
            handle_search(&mut ctx, category, keywords)
        }
        Commands::List {
            names,
            depth,
            categories,
            tags,
            aliases,
        } => {
            if categories {
                handle_categories(&mut ctx)
            } else if tags {
                handle_tags(&mut ctx)
            } else if aliases {
                handle_aliases(&mut ctx)
            } else {
                handle_names(&mut ctx, names.unwrap_or_default(), depth)
            }
        }
        Commands::Stats => handle_stats(&mut ctx),
        Commands::Alias { from, to, remove } => handle_alias(&mut ctx, from, to, remove),
        Commands::Admin { format, .. } => handle_admin(&mut ctx, format),
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
        Commands::Help { command } => handle_help(command),
    }
}

/// Logs go to stderr. `--verbose` lowers the default level from warn to
/// debug; `GAIA_LOG` takes precedence over both.
fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("gaia=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn open_api() -> Result<GaiaApi<Backend>> {
    let paths = GaiaPaths::discover()?;
    debug!(home = %paths.home.display(), "opening gaia home");
    GaiaApi::open(paths)
}

struct AddDraft {
    name: String,
    tags: Option<String>,
    desc: Option<String>,
    body: Option<String>,
    file: Option<PathBuf>,
    executable: bool,
    main: Option<String>,
}

fn handle_add(ctx: &mut AppContext, draft: AddDraft) -> Result<()> {
    let mut entry = Entry::new(draft.name, String::new())
        .with_tags(split_tags(draft.tags.as_deref().unwrap_or_default()))
        .with_desc(draft.desc.unwrap_or_default());
    entry.executable = draft.executable;
    entry.exec_file = draft.main.unwrap_or_default();

    let content = match (draft.body, draft.file) {
        (Some(body), _) => Some(body),
        (None, Some(path)) => Some(std::fs::read_to_string(&path).map_err(GaiaError::Io)?),
        (None, None) => read_piped_stdin(),
    };

    let entry = match content {
        Some(content) => Entry { content, ..entry },
        None => {
            let mut editor = ExternalEditor::new(ctx.api()?.config().editor.clone());
            let mut edited = editor.edit(&entry)?;
            if edited.content.trim().is_empty() {
                print_messages(&[CmdMessage::info("Empty content, nothing added")]);
                return Ok(());
            }
            edited.id.clear();
            edited
        }
    };

    let result = ctx.api()?.add_entry(entry)?;
    print_messages(&result.messages);
    Ok(())
}

/// Content piped into `gaia add`, if any.
fn read_piped_stdin() -> Option<String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return None;
    }
    let mut buffer = String::new();
    match stdin.read_to_string(&mut buffer) {
        Ok(_) if !buffer.trim().is_empty() => Some(buffer),
        _ => None,
    }
}

fn handle_get(ctx: &mut AppContext, id: &str, content_only: bool) -> Result<()> {
    let result = ctx.api()?.get_entry(id)?;
    if content_only {
        for entry in &result.affected_entries {
            println!("{}", entry.content);
        }
    } else {
        print_entries(&result.affected_entries);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, id: &str) -> Result<()> {
    let mut editor = ExternalEditor::new(ctx.api()?.config().editor.clone());
    let result = ctx.api()?.edit_entry(id, &mut editor)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_append(ctx: &mut AppContext, id: &str, text: Vec<String>) -> Result<()> {
    let result = ctx.api()?.append_entry(id, &text.join(" "))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_merge(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api()?.merge_entries(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_remove(ctx: &mut AppContext, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let shown = ctx.api()?.get_entry(id)?;
        let Some(entry) = shown.affected_entries.first() else {
            return Ok(());
        };
        print!("Remove ({}) {}? [yes|no]: ", entry.id, entry.name);
        io::stdout().flush().map_err(GaiaError::Io)?;

        let mut input = String::new();
        io::stdin().read_line(&mut input).map_err(GaiaError::Io)?;
        if !is_yes(&input) {
            print_messages(&[CmdMessage::info("Operation cancelled.")]);
            return Ok(());
        }
    }

    let result = ctx.api()?.remove_entry(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn handle_search(
    ctx: &mut AppContext,
    category: Option<String>,
    keywords: Vec<String>,
) -> Result<()> {
    let result = ctx.api()?.search(category.as_deref(), &keywords)?;
    print_entry_list(&result.listed_entries);
    print_messages(&result.messages);
    Ok(())
}

fn handle_names(
    ctx: &mut AppContext,
    segments: Vec<String>,
    depth: Option<usize>,
) -> Result<()> {
    let result = ctx.api()?.list_names(&segments, depth)?;
    print_tree(&result.tree_lines);
    print_messages(&result.messages);
    Ok(())
}

fn handle_categories(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api()?.list_categories()?;
    print_categories(&result.categories);
    print_messages(&result.messages);
    Ok(())
}

fn handle_tags(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api()?.list_tags()?;
    print_tags(&result.tags);
    print_messages(&result.messages);
    Ok(())
}

fn handle_aliases(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api()?.list_aliases()?;
    print_aliases(&result.aliases);
    print_messages(&result.messages);
    Ok(())
}

fn handle_stats(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api()?.stats()?;
    if let Some(stats) = &result.stats {
        print_stats(stats);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_alias(
    ctx: &mut AppContext,
    from: Option<String>,
    to: Option<String>,
    remove: Option<String>,
) -> Result<()> {
    let result = match (remove, from, to) {
        (Some(keyword), _, _) => ctx.api()?.remove_alias(&keyword)?,
        (None, Some(from), Some(to)) => ctx.api()?.add_alias(&from, &to)?,
        (None, Some(_), None) => {
            return Err(GaiaError::Api(
                "Missing alias target: gaia alias FROM TO".to_string(),
            ))
        }
        (None, None, _) => return handle_aliases(ctx),
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_admin(ctx: &mut AppContext, format: bool) -> Result<()> {
    let result = if format {
        ctx.api()?.format_data()?
    } else {
        ctx.api()?.reorganize()?
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(
    ctx: &mut AppContext,
    key: Option<String>,
    value: Option<String>,
) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api()?.config_cmd(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_help(command: Option<String>) -> Result<()> {
    match command {
        Some(cmd) => print_help_for_command(&cmd),
        None => print_grouped_help(),
    }
    Ok(())
}
