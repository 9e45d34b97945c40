//! gatekeep CLI tool.
//!
//! Usage:
//! ```bash
//! gatekeep tasks [--all]
//! gatekeep run check [-P detekt.autoCorrect=true] [--module NAME]
//! gatekeep list-conventions
//! gatekeep init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod workspace;

/// Composable build conventions with a fail-closed quality gate
#[derive(Parser)]
#[command(name = "gatekeep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tasks of every module
    Tasks {
        /// Also list tasks without a group
        #[arg(long)]
        all: bool,
    },

    /// Run tasks and their dependencies
    Run {
        /// Tasks to run
        #[arg(required = true)]
        tasks: Vec<String>,

        /// Build parameter, e.g. `-P detekt.autoCorrect=true` (repeatable)
        #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Only run in this module
        #[arg(short, long)]
        module: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available conventions
    ListConventions,

    /// Initialize configuration and tool directories
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

/// Output format for build results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable task log.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = config_resolver::resolve(&cli.root, cli.config.as_deref());

    match cli.command {
        Commands::Tasks { all } => commands::tasks::run(&cli.root, &source, all),
        Commands::Run {
            tasks,
            params,
            module,
            format,
        } => commands::run::run(&cli.root, &source, &tasks, &params, module.as_deref(), format),
        Commands::ListConventions => {
            commands::list_conventions::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(&cli.root, force),
    }
}
