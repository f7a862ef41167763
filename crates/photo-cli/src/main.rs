//! photo-sync CLI
//!
//! Mirrors photo-library albums into a static-site repository.

mod cli;
mod commands;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(photo_core::Config::default_path);
    tracing::debug!(config = %config_path.display(), "Using config");

    match cli.command {
        Some(cmd) => execute_command(cmd, config_path),
        None => {
            println!("{} Mirror photo albums into your site", "photo-sync".green().bold());
            println!();
            println!("Run {} for available commands.", "photo-sync --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` overrides
/// the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute_command(cmd: Commands, config_path: PathBuf) -> Result<()> {
    match cmd {
        Commands::Init {
            repo,
            categories,
            force,
        } => commands::run_init(&config_path, &repo, &categories, force),
        Commands::ListAlbums { unmapped_only } => {
            commands::run_list_albums(&config_path, unmapped_only)
        }
        Commands::Sync {
            dry_run,
            force,
            albums,
            category,
            no_commit,
            json,
        } => commands::run_sync(
            &config_path,
            commands::SyncArgs {
                dry_run,
                force,
                albums,
                category,
                no_commit,
                json,
            },
        ),
        Commands::Status { category, json } => {
            commands::run_status(&config_path, category.as_deref(), json)
        }
        Commands::Push { remote, yes } => commands::run_push(&config_path, remote.as_deref(), yes),
    }
}
