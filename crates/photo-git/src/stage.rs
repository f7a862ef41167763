//! Staging, committing and pushing exported files with git2

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use git2::{
    Commit, Cred, CredentialType, ErrorCode, PushOptions, RemoteCallbacks, Repository, Status,
    StatusOptions,
};

use crate::{Error, Result};

/// Information about a commit created by the commit stage.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// One line of working-tree status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Two-character code in `git status --porcelain` style
    pub code: String,
    /// Path relative to the working tree root
    pub path: String,
}

/// Check if the given path is inside a git repository.
pub fn is_git_repo(path: &Path) -> bool {
    Repository::discover(path).is_ok()
}

/// Git operations against the static-site repository.
pub struct CommitStage {
    repo: Repository,
    workdir: PathBuf,
}

impl CommitStage {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] when no repository is found and
    /// [`Error::BareRepository`] when it has no working tree.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| Error::NotARepository {
            path: path.to_path_buf(),
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::BareRepository {
                path: path.to_path_buf(),
            })?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// Root of the working tree.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        if let Ok(rel) = path.strip_prefix(&self.workdir) {
            return Ok(rel.to_path_buf());
        }
        // Symlinked temp dirs (e.g. /var -> /private/var) need canonical forms.
        let canon_root = self.workdir.canonicalize().ok();
        let canon_path = path.canonicalize().ok();
        match (canon_root, canon_path) {
            (Some(root), Some(p)) => p
                .strip_prefix(&root)
                .map(Path::to_path_buf)
                .map_err(|_| Error::PathOutsideRepo {
                    path: path.to_path_buf(),
                }),
            _ => Err(Error::PathOutsideRepo {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Stage the given files. Returns the number of paths added to the index.
    pub fn stage(&self, paths: &[PathBuf]) -> Result<usize> {
        let mut index = self.repo.index()?;
        for path in paths {
            let rel = self.relative_to_workdir(path)?;
            index.add_path(&rel)?;
        }
        index.write()?;
        tracing::debug!(count = paths.len(), "Staged exported files");
        Ok(paths.len())
    }

    /// Commit the current index.
    ///
    /// Returns `None` when the index tree equals HEAD's tree, so an idempotent
    /// re-export that rewrote identical bytes does not produce empty commits.
    pub fn commit(&self, message: &str) -> Result<Option<CommitInfo>> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent: Option<Commit<'_>> = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = &parent
            && parent.tree_id() == tree_id
        {
            tracing::info!("Nothing changed in the index; skipping commit");
            return Ok(None);
        }

        let signature = self.repo.signature()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        let commit = self.repo.find_commit(oid)?;
        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        let info = CommitInfo {
            hash: format!("{:.7}", oid),
            message: message.lines().next().unwrap_or("").to_string(),
            timestamp,
        };
        tracing::info!(hash = %info.hash, "Committed gallery changes");
        Ok(Some(info))
    }

    /// Stage `paths` and commit them. An empty path list commits nothing.
    pub fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<Option<CommitInfo>> {
        if paths.is_empty() {
            return Ok(None);
        }
        self.stage(paths)?;
        self.commit(message)
    }

    /// Get the current branch name, or `None` when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    /// Working-tree status, untracked files included, ignored files excluded.
    pub fn status(&self) -> Result<Vec<StatusEntry>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter_map(|entry| {
                let path = entry.path()?.to_string();
                Some(StatusEntry {
                    code: status_code(entry.status()).to_string(),
                    path,
                })
            })
            .collect())
    }

    /// Push the current branch to `remote`. Returns the pushed branch name.
    pub fn push(&self, remote: &str) -> Result<String> {
        let branch = self.current_branch()?.ok_or(Error::DetachedHead)?;

        let mut remote_handle =
            self.repo
                .find_remote(remote)
                .map_err(|_| Error::RemoteNotFound {
                    name: remote.to_string(),
                })?;

        let config = self.repo.config()?;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            if allowed.contains(CredentialType::SSH_KEY) {
                Cred::ssh_key_from_agent(username.unwrap_or("git"))
            } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                Cred::credential_helper(&config, url, username)
            } else {
                Cred::default()
            }
        });
        let mut opts = PushOptions::new();
        opts.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        remote_handle
            .push(&[&refspec], Some(&mut opts))
            .map_err(|e| Error::PushFailed {
                message: e.message().to_string(),
            })?;

        tracing::info!(%branch, %remote, "Pushed branch");
        Ok(branch)
    }
}

fn status_code(status: Status) -> &'static str {
    if status.is_wt_new() {
        "??"
    } else if status.is_index_new() {
        "A "
    } else if status.is_index_modified() {
        "M "
    } else if status.is_wt_modified() {
        " M"
    } else if status.is_index_deleted() {
        "D "
    } else if status.is_wt_deleted() {
        " D"
    } else if status.is_index_renamed() || status.is_wt_renamed() {
        "R "
    } else {
        "  "
    }
}
