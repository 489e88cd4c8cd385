use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use branchview::logging::{self, LogConfig, LogTarget};

mod cli_exec;

#[derive(Parser)]
#[command(name = "branchview")]
#[command(about = "Browse repository files per branch", long_about = None)]
struct Cli {
    /// Directory holding `.branchview` (defaults to current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Backend base URL (overrides the configured remote)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bearer token (overrides the configured token and BRANCHVIEW_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure or show the backend remote
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },

    /// List files at a path and show how the branch diverges from the default branch
    Ls {
        #[command(flatten)]
        target: TargetArgs,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the location opening an entry would navigate to
    Open {
        #[command(flatten)]
        target: TargetArgs,
        /// Entry name in the listing
        #[arg(long)]
        entry: String,
        /// Action marker to open it with (defaults to the entry's kind)
        #[arg(long)]
        action: Option<String>,
    },

    /// Browse files interactively
    Browse {
        #[command(flatten)]
        target: TargetArgs,
        /// Log file (defaults to .branchview/logs/branchview-<pid>.log)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    /// Show the configured remote
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the configured remote
    Set {
        #[arg(long)]
        url: String,
        #[arg(long)]
        token: String,
    },
}

#[derive(Args, Clone, Debug)]
struct TargetArgs {
    /// Project id
    #[arg(long)]
    project: u64,
    /// Path inside the repository (empty for the root)
    #[arg(long, default_value = "")]
    path: String,
    /// Branch to show (defaults to the project's default branch)
    #[arg(long)]
    branch: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("get current dir")?,
    };

    let target = match &cli.command {
        Commands::Browse { log_file, .. } => LogTarget::File(
            log_file
                .clone()
                .unwrap_or_else(|| logging::default_log_file(&root)),
        ),
        _ => LogTarget::Stderr,
    };
    let _log_guard = logging::init(LogConfig { target })?;

    cli_exec::handle_command(&cli, &root)
}
