//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// photo-sync - Mirror photo-library albums into a static-site gallery
#[derive(Parser, Debug)]
#[command(name = "photo-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config.toml
    #[arg(long, global = true, env = "PHOTO_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a starter config file
    ///
    /// Examples:
    ///   photo-sync init --repo ~/src/site
    ///   photo-sync init --repo . -c eagles -c sailing
    Init {
        /// Site repository the gallery lives in
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Allowed gallery categories
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show provider albums and where they map
    ListAlbums {
        /// Only show albums without a mapping rule
        #[arg(long)]
        unmapped_only: bool,
    },

    /// Export new and changed photos into the site repository
    ///
    /// Examples:
    ///   photo-sync sync --dry-run
    ///   photo-sync sync --album "Eagles vs Giants"
    ///   photo-sync sync --category sailing --force
    Sync {
        /// Show what would be exported without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Re-export photos even if they are up to date
        #[arg(long)]
        force: bool,

        /// Restrict to these albums (repeatable)
        #[arg(short, long = "album")]
        albums: Vec<String>,

        /// Restrict to one category
        #[arg(short, long)]
        category: Option<String>,

        /// Skip the git commit even if auto_commit is set
        #[arg(long)]
        no_commit: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show what has been exported so far
    Status {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Push committed gallery changes
    Push {
        /// Remote to push to (defaults to git.remote)
        #[arg(long)]
        remote: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sync_filters() {
        let cli = Cli::parse_from([
            "photo-sync",
            "sync",
            "--dry-run",
            "-a",
            "Sail Day",
            "--album",
            "Eagles",
            "--category",
            "sailing",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Sync {
                dry_run: true,
                force: false,
                albums: vec!["Sail Day".to_string(), "Eagles".to_string()],
                category: Some("sailing".to_string()),
                no_commit: false,
                json: false,
            })
        );
    }

    #[test]
    fn parse_list_albums() {
        let cli = Cli::parse_from(["photo-sync", "list-albums", "--unmapped-only"]);
        assert_eq!(
            cli.command,
            Some(Commands::ListAlbums {
                unmapped_only: true
            })
        );
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["photo-sync", "status", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
