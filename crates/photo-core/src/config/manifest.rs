//! Raw `config.toml` structure
//!
//! Mirrors the file one-to-one. [`super::Config::from_manifest`] validates it
//! into the resolved configuration the engine runs on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_OUTPUT_BASE: &str = "src/assets/photos";
pub(crate) const DEFAULT_OUTPUT_PATTERN: &str = "{category}/{album_slug}/{filename}";
pub(crate) const DEFAULT_COMMIT_MESSAGE: &str = "gallery: sync {count} photos from {albums}";

fn default_output_base() -> String {
    DEFAULT_OUTPUT_BASE.to_string()
}

fn default_output_pattern() -> String {
    DEFAULT_OUTPUT_PATTERN.to_string()
}

fn default_provider_kind() -> String {
    "folder".to_string()
}

fn default_max_width() -> u32 {
    2048
}

fn default_format() -> String {
    "jpg".to_string()
}

fn default_quality() -> u8 {
    85
}

fn default_true() -> bool {
    true
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

/// `[general]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralSection {
    /// Static site repository root. Required.
    pub repo_path: Option<String>,
    #[serde(default = "default_output_base")]
    pub output_base: String,
    #[serde(default = "default_output_pattern")]
    pub output_pattern: String,
    /// Allow-list of categories; empty means any.
    #[serde(default)]
    pub categories: Vec<String>,
    pub state_path: Option<String>,
    pub workers: Option<usize>,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            repo_path: None,
            output_base: default_output_base(),
            output_pattern: default_output_pattern(),
            categories: Vec::new(),
            state_path: None,
            workers: None,
        }
    }
}

/// `[provider]`: `kind` selects the registry entry, every other key is
/// handed to that provider untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default = "default_provider_kind")]
    pub kind: String,
    #[serde(flatten)]
    pub options: toml::Table,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            options: toml::Table::new(),
        }
    }
}

/// `[export]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSection {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default = "default_true")]
    pub strip_gps: bool,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            format: default_format(),
            quality: default_quality(),
            strip_gps: true,
        }
    }
}

/// `[git]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSection {
    #[serde(default = "default_true")]
    pub auto_commit: bool,
    #[serde(default)]
    pub auto_push: bool,
    #[serde(default)]
    pub push_on_failure: bool,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for GitSection {
    fn default() -> Self {
        Self {
            auto_commit: true,
            auto_push: false,
            push_on_failure: false,
            remote: default_remote(),
            commit_message: default_commit_message(),
        }
    }
}

/// `[sync.albums."Album Name"]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlbumRuleEntry {
    pub category: Option<String>,
    pub slug: Option<String>,
}

/// `[[sync.patterns]]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternRuleEntry {
    pub pattern: String,
    pub category: String,
}

/// `[sync]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    #[serde(default)]
    pub albums: BTreeMap<String, AlbumRuleEntry>,
    /// Evaluated in file order; first full-name match wins.
    #[serde(default)]
    pub patterns: Vec<PatternRuleEntry>,
}

/// The whole `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub git: GitSection,
    #[serde(default)]
    pub sync: SyncSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use photo_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [general]
    /// repo_path = "/srv/site"
    ///
    /// [[sync.patterns]]
    /// pattern = "Eagles.*"
    /// category = "eagles"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.sync.patterns[0].category, "eagles");
    /// assert_eq!(manifest.export.quality, 85);
    /// ```
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest.general.output_base, "src/assets/photos");
        assert_eq!(manifest.general.output_pattern, DEFAULT_OUTPUT_PATTERN);
        assert_eq!(manifest.export.max_width, 2048);
        assert_eq!(manifest.export.format, "jpg");
        assert!(manifest.export.strip_gps);
        assert!(manifest.git.auto_commit);
        assert!(!manifest.git.auto_push);
        assert_eq!(manifest.provider.kind, "folder");
    }

    #[test]
    fn provider_options_are_collected() {
        let manifest = Manifest::parse(
            r#"
[provider]
kind = "folder"
root = "/photos"
"#,
        )
        .unwrap();
        assert_eq!(manifest.provider.options["root"].as_str(), Some("/photos"));
    }

    #[test]
    fn unknown_export_key_is_rejected() {
        let err = Manifest::parse("[export]\nsharpen = true\n").unwrap_err();
        assert!(err.to_string().contains("sharpen"));
    }

    #[test]
    fn patterns_keep_file_order() {
        let manifest = Manifest::parse(
            r#"
[[sync.patterns]]
pattern = "Sail.*"
category = "sailing"

[[sync.patterns]]
pattern = ".*"
category = "misc"
"#,
        )
        .unwrap();
        let order: Vec<_> = manifest.sync.patterns.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(order, ["sailing", "misc"]);
    }
}
