//! Commit stage for photo-sync
//!
//! Takes the set of output paths that a sync run wrote successfully, stages
//! them in the site repository, commits them with a templated message and
//! optionally pushes the current branch. The sync engine never touches version
//! control itself; the CLI hands the execution report's written paths here.

pub mod error;
pub mod message;
pub mod stage;

pub use error::{Error, Result};
pub use message::render_commit_message;
pub use stage::{CommitInfo, CommitStage, StatusEntry, is_git_repo};
