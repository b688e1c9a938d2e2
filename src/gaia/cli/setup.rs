use clap::{ArgGroup, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "gaia",
    bin_name = "gaia",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Personal knowledge base with hierarchical names", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Debug logging (GAIA_LOG overrides)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Entry,
    Browse,
    Data,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Entry => "Entry Commands:",
            CommandGroup::Browse => "Browse Commands:",
            CommandGroup::Data => "Data Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "add" | "get" | "edit" | "append" | "merge" | "remove" => Some(CommandGroup::Entry),
            "search" | "list" | "stats" => Some(CommandGroup::Browse),
            "alias" | "admin" => Some(CommandGroup::Data),
            "config" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Entry,
            CommandGroup::Browse,
            CommandGroup::Data,
            CommandGroup::Misc,
        ]
    }
}

/// Returns the custom grouped help output as a string
pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("gaia {version}\n"));
    output.push_str("Personal knowledge base with hierarchical names\n");
    output.push('\n');
    output.push_str("Usage: gaia [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let name = sc.get_name();
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", name, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("  -v, --verbose    Debug logging (GAIA_LOG overrides)\n");
    output.push_str("  -h, --help       Print help\n");
    output.push_str("  -V, --version    Print version\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints help for a command by name
pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();

    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            print!("{}", subcmd.render_help());
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an entry (opens the editor when no body is given)
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Dash separated name, e.g. lang-go-sort
        #[arg(short, long)]
        name: String,

        /// Comma separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// One line description
        #[arg(short, long)]
        desc: Option<String>,

        /// Content
        #[arg(short, long, conflicts_with = "file")]
        body: Option<String>,

        /// Read the content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Mark the content as runnable
        #[arg(short, long)]
        executable: bool,

        /// Main file to run, for executable entries
        #[arg(short, long, requires = "executable")]
        main: Option<String>,
    },

    /// Show an entry
    #[command(alias = "g", display_order = 2)]
    Get {
        id: String,

        /// Print only the content
        #[arg(long)]
        content: bool,
    },

    /// Edit an entry in the editor
    #[command(alias = "e", display_order = 3)]
    Edit { id: String },

    /// Append text to an entry's content
    #[command(display_order = 4)]
    Append {
        id: String,

        /// Text to append (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Merge entries of one category into the first
    #[command(display_order = 5)]
    Merge {
        #[arg(required = true, num_args = 2..)]
        ids: Vec<String>,
    },

    /// Remove an entry
    #[command(alias = "rm", display_order = 6)]
    Remove {
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Find entries by category and keywords
    #[command(alias = "s", display_order = 10)]
    Search {
        /// Restrict to one category
        #[arg(short, long)]
        category: Option<String>,

        /// Every keyword must match a name segment or tag
        keywords: Vec<String>,
    },

    /// Show the name tree, categories, tags or aliases
    #[command(
        alias = "ls",
        display_order = 11,
        group(ArgGroup::new("view").args(["names", "categories", "tags", "aliases"]))
    )]
    List {
        /// Tree of names under the given segments (the default view)
        #[arg(long, num_args = 0.., value_name = "SEG")]
        names: Option<Vec<String>>,

        /// Tree depth, counting the root
        #[arg(long)]
        depth: Option<usize>,

        #[arg(long)]
        categories: bool,

        #[arg(long)]
        tags: bool,

        #[arg(long)]
        aliases: bool,
    },

    /// Entry, category and tag counts
    #[command(display_order = 12)]
    Stats,

    /// Add an alias, or remove one with --remove
    #[command(display_order = 20)]
    Alias {
        from: Option<String>,

        to: Option<String>,

        #[arg(long, value_name = "KEYWORD", conflicts_with_all = ["from", "to"])]
        remove: Option<String>,
    },

    /// Maintenance over the whole store
    #[command(
        display_order = 21,
        group(ArgGroup::new("task").args(["format", "reorg"]).required(true))
    )]
    Admin {
        /// Re-apply aliases and normalization to every entry
        #[arg(long)]
        format: bool,

        /// Reassign every id, compacting the code space
        #[arg(long)]
        reorg: bool,
    },

    /// Get or set configuration
    #[command(display_order = 30)]
    Config {
        /// Configuration key (e.g., search-limit)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for gaia or a subcommand
    #[command(display_order = 31)]
    Help { command: Option<String> },
}
