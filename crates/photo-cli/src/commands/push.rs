//! Push command

use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;

use photo_core::Config;
use photo_git::CommitStage;

use crate::error::{CliError, Result};

/// Push the site repository's current branch.
///
/// Asks before pushing when the working tree has uncommitted changes,
/// unless `yes` is set.
pub fn run_push(config_path: &Path, remote: Option<&str>, yes: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let remote = remote.unwrap_or(&config.git.remote);
    let stage = CommitStage::open(&config.repo_path)?;

    let dirty = stage.status()?;
    if !dirty.is_empty() && !yes {
        println!(
            "{} {} uncommitted change(s) will not be pushed:",
            "warning:".yellow().bold(),
            dirty.len()
        );
        for entry in dirty.iter().take(10) {
            println!("   {} {}", entry.code.yellow(), entry.path);
        }
        let proceed = Confirm::new()
            .with_prompt("Push committed changes anyway?")
            .default(false)
            .interact()?;
        if !proceed {
            return Err(CliError::user("Push cancelled"));
        }
    }

    println!("{} Pushing to {}...", "=>".blue().bold(), remote.cyan());
    let branch = stage.push(remote)?;
    println!("{} Pushed {} to {}", "OK".green().bold(), branch.cyan(), remote);
    Ok(())
}
