//! Ward CLI - command-line front end for the scan pipeline
//!
//! The CLI is a thin collaborator of the core: it loads configuration,
//! builds the event bus and subscribes the presentation layer, hands both to
//! the orchestrator, and translates the outcome into an exit code.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Exit codes, per the CI contract: zero for a clean scan or findings below
/// the gate, one for gated findings, invalid configuration, or an aborted
/// pipeline.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Ward - security scanner for Laravel projects
#[derive(Parser, Debug)]
#[command(
    name = "ward",
    version,
    about = "Security scanner for Laravel projects",
    long_about = "Ward scans a Laravel project (local path or remote repository) for security \
                  issues: environment and configuration hardening, known-vulnerable \
                  dependencies via OSV.dev, and user-defined YAML rules."
)]
pub struct Cli {
    /// Configuration file path (defaults to ~/.ward/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a Laravel project for security issues
    Scan(commands::scan::ScanArgs),
    /// Create ~/.ward with a default configuration and an example rule file
    Init,
    /// List the loaded custom rules
    Rules,
    /// Show stored scan history
    History(commands::history::HistoryArgs),
}

/// Dispatch the parsed command line; returns the process exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Scan(args) => commands::scan::run(cli.config.as_deref(), args).await,
        Command::Init => commands::init::run(),
        Command::Rules => commands::rules::run(cli.config.as_deref()),
        Command::History(args) => commands::history::run(args),
    }
}

/// Load the configuration from an explicit path or the default location.
pub(crate) fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ward_core::WardConfig> {
    let config = match path {
        Some(path) => ward_core::WardConfig::load_from(path)?,
        None => ward_core::WardConfig::load()?,
    };
    Ok(config)
}
