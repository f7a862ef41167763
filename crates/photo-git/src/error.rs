//! Error types for photo-git

use std::path::PathBuf;

/// Result type for photo-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in photo-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Repository at {path} has no working directory")]
    BareRepository { path: PathBuf },

    #[error("Path {path} is outside the repository working tree")]
    PathOutsideRepo { path: PathBuf },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("HEAD is detached; check out a branch before pushing")]
    DetachedHead,

    #[error("Push failed: {message}")]
    PushFailed { message: String },
}
