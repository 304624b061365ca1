//! Command line interface.

mod commands;
mod output;

use std::path::PathBuf;

use clap::Parser;

use scopewatch::config::{load_settings_with_options, LoadOptions};

pub use output::Output;

#[derive(Parser)]
#[command(name = "scopewatch")]
#[command(about = "Bug bounty scope monitor: reports newly eligible assets")]
#[command(version)]
pub struct Cli {
    /// Get the active scope of a single program (e.g. h1:dyson)
    #[arg(short, long, value_name = "PLATFORM:PROGRAM")]
    scope: Option<String>,

    /// Only print scope updates on stdout
    #[arg(long)]
    only_updates: bool,

    /// List the programs being monitored
    #[arg(long, conflicts_with = "scope")]
    actives: bool,

    /// Save fetched scopes as CSV files in the current directory
    #[arg(long)]
    csv: bool,

    /// Config file path (default: ~/.config/scopewatch/config.yaml)
    #[arg(short, long, env = "SCOPEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot directory, overriding `state_dir` from the config file
    #[arg(long, env = "SCOPEWATCH_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and run the selected mode.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let out = Output::new(cli.only_updates);

    let (settings, config) = load_settings_with_options(LoadOptions {
        config_path: cli.config.clone(),
        state_dir: cli.state_dir.clone().filter(|p| !p.as_os_str().is_empty()),
        ..Default::default()
    })?;

    out.banner();

    if let Some(ref selector) = cli.scope {
        commands::cmd_scope(&settings, &config, &out, selector, cli.csv).await
    } else if cli.actives {
        commands::cmd_actives(&config, &out);
        Ok(())
    } else {
        commands::cmd_watch(&settings, &config, &out).await
    }
}
