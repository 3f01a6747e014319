//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// prog - Local task and epic tracking for AI coding agents
#[derive(Parser, Debug)]
#[command(name = "prog", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.prog/prog.db)
    #[arg(long, global = true, env = "PROG_DB")]
    pub db: Option<PathBuf>,

    /// Project scope for new items and listings
    #[arg(short, long, global = true, env = "PROG_PROJECT")]
    pub project: Option<String>,

    /// Actor name for audit trail
    #[arg(long, global = true, env = "PROG_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON (for agent integration)
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the prog database
    Init {
        /// Overwrite existing database
        #[arg(long)]
        force: bool,
    },

    /// Create a task (or an epic with --epic)
    Add(AddArgs),

    /// Show an item with its dependencies, labels and logs
    Show {
        /// Item ID
        id: String,
    },

    /// List items
    List(ListArgs),

    /// List tasks ready to work on
    Ready {
        /// Only tasks carrying this label (repeatable, all must match)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Maximum tasks to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Project status overview
    Status,

    /// Mark item(s) as in progress
    Start {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Hand an in-progress task over for review
    Review {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Mark item(s) as blocked
    Block {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Mark item(s) as done (force-closes an epic)
    Done {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Cancel item(s)
    Cancel {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Reopen task(s)
    Reopen {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Append a log entry to an item
    Log {
        /// Item ID
        id: String,

        /// Log message
        message: String,
    },

    /// Show the change history of an item
    History {
        /// Item ID
        id: String,

        /// Maximum number of events to show
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Edit an item's fields
    Edit(EditArgs),

    /// Move an item under an epic, or detach it with no epic
    Parent {
        /// Item ID
        id: String,

        /// Epic ID (omit to detach)
        epic: Option<String>,
    },

    /// Delete item(s)
    Delete {
        /// Item IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Manage dependencies
    Dep {
        #[command(subcommand)]
        command: DepCommands,
    },

    /// Manage labels
    Label {
        #[command(subcommand)]
        command: LabelCommands,
    },

    /// List known projects
    Projects,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Item title
    pub title: String,

    /// Create an epic instead of a task
    #[arg(long)]
    pub epic: bool,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Definition of done: what must be true before closing
    #[arg(long)]
    pub dod: Option<String>,

    /// Priority (1-3, P1-P3, high/medium/low)
    #[arg(long, default_value = "2")]
    pub priority: String,

    /// Parent epic ID
    #[arg(long)]
    pub parent: Option<String>,

    /// Labels (repeatable)
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// IDs this item depends on (repeatable)
    #[arg(long = "blocks-on")]
    pub depends_on: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Filter by effective status
    #[arg(short, long)]
    pub status: Option<String>,

    /// Filter by type (task, epic)
    #[arg(short = 't', long = "type")]
    pub item_type: Option<String>,

    /// Direct children of this epic
    #[arg(long)]
    pub parent: Option<String>,

    /// Items that block this ID
    #[arg(long)]
    pub blocking: Option<String>,

    /// Items blocked by this ID
    #[arg(long)]
    pub blocked_by: Option<String>,

    /// Only items with unresolved dependencies
    #[arg(long)]
    pub has_blockers: bool,

    /// Only items with no unresolved dependencies
    #[arg(long)]
    pub no_blockers: bool,

    /// Filter by label (repeatable, all must match)
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// Maximum items to return
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Item ID
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Replace the description
    #[arg(short, long, conflicts_with = "append")]
    pub description: Option<String>,

    /// Append to the description
    #[arg(long)]
    pub append: Option<String>,

    /// New priority (1-3, P1-P3, high/medium/low)
    #[arg(long)]
    pub priority: Option<String>,

    /// Move the item to another project
    #[arg(long = "move-to")]
    pub move_to: Option<String>,

    /// Replace the definition of done
    #[arg(long, conflicts_with = "clear_dod")]
    pub dod: Option<String>,

    /// Remove the definition of done
    #[arg(long)]
    pub clear_dod: bool,
}

#[derive(Subcommand, Debug)]
pub enum DepCommands {
    /// Make ITEM depend on DEPENDS_ON
    Add {
        /// Dependent item
        item: String,

        /// Item it waits for
        depends_on: String,
    },

    /// Remove a dependency
    Remove {
        /// Dependent item
        item: String,

        /// Item it waits for
        depends_on: String,
    },

    /// List dependencies of an item, or every edge in the project
    List {
        /// Item ID (omit for all edges)
        id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    /// Attach labels to an item
    Add {
        /// Item ID
        id: String,

        /// Labels
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Remove labels from an item
    Remove {
        /// Item ID
        id: String,

        /// Labels
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_epic_with_labels() {
        let cli = Cli::try_parse_from([
            "prog", "add", "Ship v2", "--epic", "-l", "release", "-l", "q3", "-p", "web",
        ])
        .unwrap();
        assert_eq!(cli.project.as_deref(), Some("web"));
        match cli.command {
            Commands::Add(args) => {
                assert!(args.epic);
                assert_eq!(args.labels, vec!["release", "q3"]);
                assert_eq!(args.priority, "2");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_dep_add() {
        let cli = Cli::try_parse_from(["prog", "dep", "add", "ts-aaaaaa", "ep-bbbbbb"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Dep {
                command: DepCommands::Add { .. }
            }
        ));
    }

    #[test]
    fn test_edit_rejects_replace_and_append() {
        let result = Cli::try_parse_from([
            "prog", "edit", "ts-aaaaaa", "-d", "new", "--append", "more",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_dod_conflicts_with_clear() {
        let result = Cli::try_parse_from([
            "prog", "edit", "ts-aaaaaa", "--dod", "tests pass", "--clear-dod",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["prog", "edit", "ts-aaaaaa", "--clear-dod"]).unwrap();
        assert!(matches!(cli.command, Commands::Edit(EditArgs { clear_dod: true, .. })));
    }
}
