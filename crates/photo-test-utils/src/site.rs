//! Site repository fixture with a photo-sync config file.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git::real_git_repo_with_commit;

/// A temporary static-site git repository plus a state/config directory.
pub struct TestSite {
    repo_dir: TempDir,
    config_dir: TempDir,
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSite {
    /// Create a site repository with one initial commit.
    pub fn new() -> Self {
        let repo_dir = TempDir::new().expect("TestSite: create repo dir");
        real_git_repo_with_commit(repo_dir.path());
        Self {
            repo_dir,
            config_dir: TempDir::new().expect("TestSite: create config dir"),
        }
    }

    /// Create a site directory that is not a git repository.
    pub fn without_git() -> Self {
        Self {
            repo_dir: TempDir::new().expect("TestSite: create repo dir"),
            config_dir: TempDir::new().expect("TestSite: create config dir"),
        }
    }

    /// Root of the site repository.
    pub fn repo_path(&self) -> &Path {
        self.repo_dir.path()
    }

    /// Path of the config file written by [`TestSite::write_config`].
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("config.toml")
    }

    /// Path of the state file the config points at.
    pub fn state_path(&self) -> PathBuf {
        self.config_dir.path().join("state.redb")
    }

    /// Absolute path of an exported file under the default output base.
    pub fn output_file(&self, relative: &str) -> PathBuf {
        self.repo_path().join("src/assets/photos").join(relative)
    }

    /// Write a config pointing at `library_root`, followed by `extra` TOML
    /// (mapping rules, export overrides, ...).
    pub fn write_config(&self, library_root: &Path, extra: &str) -> PathBuf {
        let content = format!(
            r#"[general]
repo_path = "{repo}"
state_path = "{state}"
workers = 2

[provider]
kind = "folder"
root = "{library}"

{extra}
"#,
            repo = toml_path(self.repo_path()),
            state = toml_path(&self.state_path()),
            library = toml_path(library_root),
        );
        let path = self.config_path();
        fs::write(&path, content).expect("TestSite: write config");
        path
    }
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
