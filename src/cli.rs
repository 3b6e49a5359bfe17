//! CLI parsing and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};

use crate::{commands, error::Result};

/// Parsed command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "shellican",
    version,
    about = "Organize and run collections of shell commands and scripts"
)]
struct Cli {
    /// Control colored output.
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,
    /// Enable verbose output.
    #[arg(long)]
    verbose: bool,
    /// Command to execute (defaults to list).
    #[command(subcommand)]
    command: Option<Command>,
}

/// Supported color output modes.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    /// Only colorize when stdout is a TTY.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}

// Commands are ordered alphabetically - maintain this order.
/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Create a helper in ~/.local/bin that runs a collection's runnables.
    CreateShell {
        /// Collection the helper runs.
        collection: String,
        /// Helper file name (defaults to <collection>-shell).
        name: Option<String>,
        /// Overwrite an existing helper without prompting.
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Archive a collection as .tar.gz or .zip.
    Export {
        /// Collection to export.
        collection: String,
        /// Output file (defaults to <collection>.tar.gz).
        output: Option<String>,
        /// Overwrite an existing output file.
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Import a collection from a folder, archive, URL, or git repository.
    Import {
        /// Folder, .tar.gz/.tgz/.zip file, HTTPS archive URL, or git URL.
        source: String,
        /// Collection name (inferred from the source when omitted).
        name: Option<String>,
    },
    /// List collections, or the runnables of one collection.
    #[command(alias = "ls")]
    List {
        /// Collection whose runnables to list.
        collection: Option<String>,
        /// Print entries as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Scaffold a new collection, or a new runnable inside one.
    New {
        /// Collection to create or extend.
        collection: String,
        /// Runnable to add to the collection.
        runnable: Option<String>,
    },
    /// Run a runnable from a collection.
    Run {
        /// Collection containing the runnable.
        collection: String,
        /// Runnable to run.
        runnable: String,
        /// Arguments passed to hooks and the main action.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show details of a collection or runnable.
    Show {
        /// Collection to show.
        collection: String,
        /// Runnable to show.
        runnable: Option<String>,
        /// Include the README contents.
        #[arg(long)]
        readme: bool,
        /// Send output through a pager.
        #[arg(long)]
        pager: Option<String>,
    },
}

/// Run the requested command.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let color = cli.color.into_choice();

    // Match arms are ordered alphabetically - maintain this order.
    match cli.command.unwrap_or(Command::List {
        collection: None,
        json: false,
    }) {
        Command::CreateShell {
            collection,
            name,
            force,
        } => commands::create_shell::run(collection, name, force).await,
        Command::Export {
            collection,
            output,
            force,
        } => commands::export::run(color, cli.verbose, collection, output, force).await,
        Command::Import { source, name } => {
            commands::import::run(color, cli.verbose, source, name).await
        }
        Command::List { collection, json } => commands::list::run(color, collection, json).await,
        Command::New {
            collection,
            runnable,
        } => commands::new::run(color, cli.verbose, collection, runnable).await,
        Command::Run {
            collection,
            runnable,
            args,
        } => commands::run::run(color, cli.verbose, collection, runnable, args).await,
        Command::Show {
            collection,
            runnable,
            readme,
            pager,
        } => commands::show::run(color, cli.verbose, collection, runnable, readme, pager).await,
    }
}

impl ColorMode {
    /// Convert a CLI color mode into a color choice.
    fn into_choice(self) -> commands::ColorChoice {
        match self {
            Self::Auto => commands::ColorChoice::Auto,
            Self::Always => commands::ColorChoice::Always,
            Self::Never => commands::ColorChoice::Never,
        }
    }
}
