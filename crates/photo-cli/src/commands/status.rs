//! Status command: what the state store says has been exported

use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;
use serde_json::json;

use photo_core::{Config, StateStore};
use photo_git::{CommitStage, is_git_repo};

use crate::error::Result;

/// Print exported photos, per-category counts and uncommitted gallery changes.
pub fn run_status(config_path: &Path, category: Option<&str>, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let state = StateStore::open(&config.state_path)?;
    let records = match category {
        Some(category) => state.list_by_category(category)?,
        None => state.list_all()?,
    };

    let mut per_category: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *per_category.entry(record.category.as_str()).or_default() += 1;
    }
    let last_sync = records.iter().map(|r| r.synced_at).max();

    let pending = if is_git_repo(&config.repo_path) {
        let stage = CommitStage::open(&config.repo_path)?;
        let base = config.output_base.trim_end_matches('/');
        Some(
            stage
                .status()?
                .into_iter()
                .filter(|e| base.is_empty() || e.path.starts_with(base))
                .count(),
        )
    } else {
        None
    };

    if json {
        let value = json!({
            "state_path": config.state_path.display().to_string(),
            "total": records.len(),
            "categories": per_category,
            "last_sync": last_sync.map(|t| t.to_rfc3339()),
            "uncommitted": pending,
            "records": records,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {}", "Repository:".bold(), config.repo_path.display());
    println!("{} {}", "State:".bold(), config.state_path.display());
    println!();

    if records.is_empty() {
        println!("No photos exported yet. Run {}.", "photo-sync sync".cyan());
    } else {
        for record in &records {
            println!(
                "   {} {} {}",
                record.output_path.cyan(),
                record.album.dimmed(),
                record.synced_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
            );
        }
        println!();
        for (category, count) in &per_category {
            println!("   {} {:<20} {} photos", "-".blue(), category.cyan(), count);
        }
        println!();
        println!("{} photos exported", records.len().to_string().green());
        if let Some(last) = last_sync {
            println!("Last sync: {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    match pending {
        Some(0) => println!("Gallery changes: {}", "clean".green()),
        Some(n) => println!(
            "Gallery changes: {} uncommitted file(s)",
            n.to_string().yellow()
        ),
        None => println!(
            "{} {} is not a git repository",
            "warning:".yellow().bold(),
            config.repo_path.display()
        ),
    }
    Ok(())
}
