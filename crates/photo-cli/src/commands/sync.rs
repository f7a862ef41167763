//! Sync command: plan, export, then hand written files to the commit stage

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use serde_json::json;

use photo_core::provider::ProviderRegistry;
use photo_core::sync::{AlbumFilter, EntryReport, EntryStatus, SyncOptions};
use photo_core::{Config, ExecutionReport, SyncEngine};
use photo_git::{CommitInfo, CommitStage, render_commit_message};

use crate::error::{CliError, Result};

/// Flags for [`run_sync`].
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub dry_run: bool,
    pub force: bool,
    pub albums: Vec<String>,
    pub category: Option<String>,
    pub no_commit: bool,
    pub json: bool,
}

/// Run the sync command.
///
/// Exits with an error when any photo failed to export, after committing
/// (and, if configured, pushing) everything that did succeed.
///
/// When the run will commit, the repository is opened before anything is
/// exported, so a bad `repo_path` fails without touching state or output.
pub fn run_sync(config_path: &Path, args: SyncArgs) -> Result<()> {
    let config = Config::load(config_path)?;
    if let Some(category) = &args.category
        && !config.categories.is_empty()
        && !config.categories.contains(category)
    {
        return Err(CliError::user(format!(
            "Unknown category {category:?} (configured: {})",
            config.categories.join(", ")
        )));
    }
    let git = config.git.clone();
    let repo_path = config.repo_path.clone();
    if !repo_path.is_dir() {
        return Err(CliError::user(format!(
            "Repository path does not exist: {}",
            repo_path.display()
        )));
    }
    let stage = if !args.dry_run && git.auto_commit && !args.no_commit {
        Some(CommitStage::open(&repo_path)?)
    } else {
        None
    };

    let mut engine = SyncEngine::from_config(config, &ProviderRegistry::with_builtins())?;
    if !args.json && !args.dry_run {
        engine = engine.with_progress(Arc::new(print_progress));
    }

    let options = SyncOptions {
        force: args.force,
        dry_run: args.dry_run,
        filter: AlbumFilter {
            albums: args.albums.clone(),
            category: args.category.clone(),
        },
    };

    if !args.json {
        let verb = if args.dry_run { "Planning" } else { "Syncing" };
        println!("{} {} photos...", "=>".blue().bold(), verb);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let (_, report) = runtime.block_on(engine.run(&options))?;

    let mut commit = None;
    let mut pushed = None;
    let exported = report.exported_paths();
    if let Some(stage) = stage.as_ref().filter(|_| !exported.is_empty()) {
        let message =
            render_commit_message(&git.commit_message, exported.len(), &report.albums_with_exports());
        commit = stage.commit_paths(&exported, &message)?;

        if commit.is_some() && git.auto_push {
            if report.is_success() || git.push_on_failure {
                pushed = Some(stage.push(&git.remote)?);
            } else {
                tracing::warn!("Skipping push because some exports failed");
            }
        }
    }

    if args.json {
        print_json(&report, commit.as_ref(), pushed.as_deref())?;
    } else {
        print_summary(&report, commit.as_ref(), pushed.as_deref(), &git.remote);
    }

    let failed = report.counts().failed;
    if failed > 0 {
        return Err(CliError::user(format!(
            "{failed} photo(s) failed to export; re-run sync to retry"
        )));
    }
    Ok(())
}

fn print_progress(entry: &EntryReport) {
    let id = entry.photo_id.as_deref().unwrap_or("-");
    match &entry.status {
        EntryStatus::Exported { .. } => {
            let path = entry.output_path.as_deref().unwrap_or_default();
            println!("   {} {} -> {}", "+".green(), id, path.cyan());
        }
        EntryStatus::Failed { error } => {
            println!("   {} {}: {}", "!".red(), id, error);
        }
        _ => {}
    }
}

fn print_summary(
    report: &ExecutionReport,
    commit: Option<&CommitInfo>,
    pushed: Option<&str>,
    remote: &str,
) {
    if report.dry_run {
        for entry in &report.entries {
            let id = entry.photo_id.as_deref().unwrap_or("-");
            match entry.status {
                EntryStatus::WouldExport => println!(
                    "   {} {} -> {} ({})",
                    "+".green(),
                    id,
                    entry.output_path.as_deref().unwrap_or_default().cyan(),
                    entry.reason.to_string().dimmed()
                ),
                EntryStatus::Unmapped => {
                    println!("   {} {} (unmapped)", "?".yellow(), entry.album)
                }
                _ => {}
            }
        }
    }

    let counts = report.counts();
    println!();
    if report.dry_run {
        println!(
            "{} Would export {}, skip {}, {} unmapped",
            "DRY RUN".yellow().bold(),
            counts.would_export,
            counts.skipped,
            counts.unmapped
        );
        return;
    }

    println!(
        "{} Exported {}, skipped {}, {} unmapped, {} failed",
        if report.is_success() {
            "OK".green().bold()
        } else {
            "PARTIAL".yellow().bold()
        },
        counts.exported,
        counts.skipped,
        counts.unmapped,
        counts.failed
    );
    if let Some(commit) = commit {
        println!("   Committed {} {}", commit.hash[..7.min(commit.hash.len())].cyan(), commit.message);
    }
    if let Some(branch) = pushed {
        println!("   Pushed {} to {}", branch.cyan(), remote);
    }
}

fn print_json(
    report: &ExecutionReport,
    commit: Option<&CommitInfo>,
    pushed: Option<&str>,
) -> Result<()> {
    let counts = report.counts();
    let entries: Vec<_> = report
        .entries
        .iter()
        .map(|e| {
            let (status, error) = match &e.status {
                EntryStatus::Exported { .. } => ("exported", None),
                EntryStatus::WouldExport => ("would_export", None),
                EntryStatus::Skipped => ("skipped", None),
                EntryStatus::Unmapped => ("unmapped", None),
                EntryStatus::Failed { error } => ("failed", Some(error.as_str())),
            };
            json!({
                "album": e.album,
                "photo_id": e.photo_id,
                "output_path": e.output_path,
                "action": e.action.to_string(),
                "reason": e.reason.to_string(),
                "status": status,
                "error": error,
            })
        })
        .collect();

    let value = json!({
        "dry_run": report.dry_run,
        "counts": {
            "exported": counts.exported,
            "would_export": counts.would_export,
            "skipped": counts.skipped,
            "unmapped": counts.unmapped,
            "failed": counts.failed,
        },
        "commit": commit.map(|c| c.hash.clone()),
        "pushed": pushed,
        "entries": entries,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
