//! Init command: write a starter config

use std::path::Path;

use colored::Colorize;

use photo_core::config::write_default_config;
use photo_git::is_git_repo;

use crate::error::{CliError, Result};

/// Write a commented config file at `config_path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn run_init(config_path: &Path, repo: &Path, categories: &[String], force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(CliError::user(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let repo = if repo.is_absolute() {
        repo.to_path_buf()
    } else {
        std::env::current_dir()?.join(repo)
    };
    let repo = without_cur_dir(&repo);

    if !is_git_repo(&repo) {
        println!(
            "{} {} is not a git repository; commits will fail until it is.",
            "warning:".yellow().bold(),
            repo.display()
        );
    }

    write_default_config(config_path, &repo.display().to_string(), categories)?;

    println!(
        "{} Wrote {}",
        "OK".green().bold(),
        config_path.display().to_string().cyan()
    );
    println!();
    println!("Next steps:");
    println!("  1. Set {} to your photo library", "provider.root".cyan());
    println!("  2. Add album rules under {}", "[sync.albums]".cyan());
    println!("  3. Run {}", "photo-sync list-albums".cyan());
    Ok(())
}

/// Drop `.` components so the written path reads cleanly.
fn without_cur_dir(path: &Path) -> std::path::PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
