//! Configuration loading and validation
//!
//! `config.toml` is parsed into a [`Manifest`] and validated into a
//! [`Config`]. Every problem found here is a configuration error and stops
//! the run before a plan is produced.
//!
//! # Example
//!
//! ```ignore
//! use photo_core::config::Config;
//!
//! let config = Config::load(&Config::default_path())?;
//! println!("exporting into {}", config.output_root().display());
//! ```

mod export;
mod manifest;
mod template;

pub use export::{ExportParams, ImageFormat};
pub use manifest::{
    AlbumRuleEntry, ExportSection, GeneralSection, GitSection, Manifest, PatternRuleEntry,
    ProviderSection, SyncSection,
};
pub use template::{OutputTemplate, output_filename};

use std::path::{Path, PathBuf};

use crate::mapping::{GalleryTarget, MappingResolver};
use crate::{Error, Result};

const APP_DIR: &str = "photo-sync";
const MAX_DEFAULT_WORKERS: usize = 4;

/// Provider selection plus its provider-specific options.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: String,
    pub options: toml::Table,
}

impl ProviderConfig {
    /// Required string option.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.options
            .get(key)
            .and_then(toml::Value::as_str)
            .ok_or_else(|| Error::MissingField {
                field: format!("provider.{key}"),
            })
    }
}

/// Commit stage settings.
#[derive(Debug, Clone)]
pub struct GitConfig {
    pub auto_commit: bool,
    pub auto_push: bool,
    /// Push even when some exports in the run failed.
    pub push_on_failure: bool,
    pub remote: String,
    pub commit_message: String,
}

/// Resolved, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo_path: PathBuf,
    /// Output base relative to `repo_path`
    pub output_base: String,
    pub output_template: OutputTemplate,
    pub categories: Vec<String>,
    pub state_path: PathBuf,
    /// Bounded export pool size
    pub workers: usize,
    pub provider: ProviderConfig,
    pub export: ExportParams,
    pub git: GitConfig,
    pub mapping: MappingResolver,
}

impl Config {
    /// Default config file location: `<config dir>/photo-sync/config.toml`.
    pub fn default_path() -> PathBuf {
        default_dir().join("config.toml")
    }

    /// Default state file location: `<config dir>/photo-sync/state.redb`.
    pub fn default_state_path() -> PathBuf {
        default_dir().join("state.redb")
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist and a
    /// configuration error for anything malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = photo_fs::read_text(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config content.
    pub fn parse(content: &str) -> Result<Self> {
        let manifest = Manifest::parse(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {e}")))?;
        Self::from_manifest(manifest)
    }

    /// Validate a parsed manifest.
    pub fn from_manifest(manifest: Manifest) -> Result<Self> {
        let general = manifest.general;

        let repo_path = general
            .repo_path
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(expand_home)
            .ok_or_else(|| Error::MissingField {
                field: "general.repo_path".to_string(),
            })?;

        let output_base = photo_fs::NormalizedPath::new(&general.output_base);
        if output_base.has_traversal() || output_base.is_absolute() {
            return Err(Error::config(format!(
                "general.output_base {:?} must be relative to repo_path without '..'",
                general.output_base
            )));
        }

        let output_template = OutputTemplate::parse(&general.output_pattern)?;

        let workers = match general.workers {
            Some(0) => return Err(Error::config("general.workers must be at least 1")),
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get().min(MAX_DEFAULT_WORKERS))
                .unwrap_or(1),
        };

        let state_path = general
            .state_path
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(Self::default_state_path);

        let export = ExportParams::new(
            &manifest.export.format,
            manifest.export.max_width,
            manifest.export.quality,
            manifest.export.strip_gps,
        )?;

        let categories = general.categories;
        for category in &categories {
            validate_segment("general.categories", category)?;
        }

        let mut explicit = Vec::with_capacity(manifest.sync.albums.len());
        for (album, rule) in manifest.sync.albums {
            let category = rule.category.ok_or_else(|| Error::MissingField {
                field: format!("sync.albums.{album:?}.category"),
            })?;
            let slug = rule.slug.ok_or_else(|| Error::MissingField {
                field: format!("sync.albums.{album:?}.slug"),
            })?;
            validate_segment("category", &category)?;
            validate_segment("slug", &slug)?;
            check_category_allowed(&categories, &category)?;
            explicit.push((album, GalleryTarget::new(category, slug)));
        }

        let mut patterns = Vec::with_capacity(manifest.sync.patterns.len());
        for rule in manifest.sync.patterns {
            validate_segment("category", &rule.category)?;
            check_category_allowed(&categories, &rule.category)?;
            patterns.push((rule.pattern, rule.category));
        }

        let mapping = MappingResolver::new(explicit, patterns)?;

        Ok(Self {
            repo_path,
            output_base: output_base.as_str().trim_end_matches('/').to_string(),
            output_template,
            categories,
            state_path,
            workers,
            provider: ProviderConfig {
                kind: manifest.provider.kind,
                options: manifest.provider.options,
            },
            export,
            git: GitConfig {
                auto_commit: manifest.git.auto_commit,
                auto_push: manifest.git.auto_push,
                push_on_failure: manifest.git.push_on_failure,
                remote: manifest.git.remote,
                commit_message: manifest.git.commit_message,
            },
            mapping,
        })
    }

    /// Absolute directory exported files are written under.
    pub fn output_root(&self) -> PathBuf {
        if self.output_base.is_empty() {
            self.repo_path.clone()
        } else {
            self.repo_path.join(&self.output_base)
        }
    }
}

/// Write a commented default config file.
///
/// The file is created with owner-only permissions on unix.
pub fn write_default_config(path: &Path, repo_path: &str, categories: &[String]) -> Result<()> {
    let cats = categories
        .iter()
        .map(|c| format!("{c:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    let content = format!(
        r#"[general]
repo_path = {repo_path:?}
output_base = "{base}"
output_pattern = "{pattern}"
categories = [{cats}]

[provider]
kind = "folder"
root = "~/Pictures/gallery"

[export]
max_width = 2048
format = "jpg"
# Only used by jpg.
quality = 85
# The built-in exporter never copies EXIF, so GPS is always stripped.
# Changing this flag still re-exports every photo.
strip_gps = true

[git]
auto_commit = true
auto_push = false
commit_message = "{message}"

# Map specific albums to categories:
# [sync.albums."My Album Name"]
# category = "sailing"
# slug = "2025-summer-sail"

# Map album name patterns to categories (full-name match, first match wins):
# [[sync.patterns]]
# pattern = "Eagles.*"
# category = "eagles"
"#,
        base = manifest::DEFAULT_OUTPUT_BASE,
        pattern = manifest::DEFAULT_OUTPUT_PATTERN,
        message = manifest::DEFAULT_COMMIT_MESSAGE,
    );

    photo_fs::write_atomic(path, content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw));
    }
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

fn default_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn validate_segment(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty()
        || value.contains('/')
        || value.contains('\\')
        || value == "."
        || value == ".."
    {
        return Err(Error::config(format!(
            "Invalid {kind} {value:?}: must be a single non-empty path segment"
        )));
    }
    Ok(())
}

fn check_category_allowed(categories: &[String], category: &str) -> Result<()> {
    if !categories.is_empty() && !categories.iter().any(|c| c == category) {
        return Err(Error::config(format!(
            "Category {category:?} is not listed in general.categories"
        )));
    }
    Ok(())
}
