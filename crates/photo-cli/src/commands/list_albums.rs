//! List-albums command

use std::path::Path;

use colored::Colorize;

use photo_core::provider::ProviderRegistry;
use photo_core::{Config, Resolution, SyncEngine};

use crate::error::Result;

/// Print every provider album with its resolved gallery target.
pub fn run_list_albums(config_path: &Path, unmapped_only: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let engine = SyncEngine::from_config(config, &ProviderRegistry::with_builtins())?;
    let listing = engine.list_albums()?;

    let mut mapped = 0;
    let mut unmapped = 0;
    for mapping in &listing.mappings {
        let count = mapping.album.photo_ids.len();
        match &mapping.resolution {
            Resolution::Mapped { target, source } => {
                mapped += 1;
                if unmapped_only {
                    continue;
                }
                println!(
                    "   {} {} -> {} ({}, {} photos)",
                    "+".green(),
                    mapping.album.name,
                    target.to_string().cyan(),
                    source.to_string().dimmed(),
                    count
                );
            }
            Resolution::Unmapped => {
                unmapped += 1;
                println!(
                    "   {} {} ({} photos)",
                    "?".yellow(),
                    mapping.album.name,
                    count
                );
            }
        }
    }

    for conflict in &listing.conflicts {
        println!(
            "{} {:?} and {:?} both map to {}",
            "CONFLICT".red().bold(),
            conflict.first,
            conflict.second,
            conflict.target.to_string().cyan()
        );
    }

    println!();
    println!(
        "{} albums: {} mapped, {} unmapped",
        listing.mappings.len(),
        mapped.to_string().green(),
        unmapped.to_string().yellow()
    );
    if unmapped > 0 {
        println!("Add rules under {} to include unmapped albums.", "[sync.albums]".cyan());
    }
    Ok(())
}
