//! boardmark library root.
//! Exposes the CLI parser, the high-level run() function, and the
//! annotation engine (geometry, store, session, file manager, controller).

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod files;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, config_path: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg, config_path),
        Commands::Search { .. } => cli::commands::search::handle(&cli.command, cfg),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg),
        Commands::History { .. } => cli::commands::history::handle(&cli.command, cfg),
        Commands::Del { .. } => cli::commands::del::handle(&cli.command, cfg),
        Commands::Restore { .. } => cli::commands::restore::handle(&cli.command, cfg),
        Commands::Manifest { .. } => cli::commands::manifest::handle(&cli.command, cfg),
        Commands::Maintain { .. } => cli::commands::maintain::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Session { .. } => cli::commands::session::handle(&cli.command, cfg),
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();

    // Configuration is loaded once and handed to every command.
    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_file);
    let mut cfg = Config::load(Some(config_path.as_path()))?;

    if let Some(root) = &cli.root {
        cfg.storage_root = root.clone();
    }
    if let Some(worker) = &cli.worker {
        cfg.worker_no = worker.clone();
    }

    tracing::debug!(config = %config_path.display(), root = %cfg.storage_root, "configuration loaded");
    dispatch(&cli, &cfg, &config_path)
}
