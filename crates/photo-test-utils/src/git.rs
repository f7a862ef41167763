//! Git repository fixtures.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Initialises a real git repository using `git2` (no initial commit).
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository with an initial commit using the `git` CLI.
///
/// Configures a local identity and disables signing so later commits made
/// through `git2` find a signature.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    let run = |args: &[&str]| {
        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .unwrap_or_else(|e| {
                panic!("real_git_repo_with_commit: failed to run `git {args:?}`: {e}")
            });
        if !output.status.success() {
            panic!(
                "real_git_repo_with_commit: `git {args:?}` failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
    };

    run(&["init"]);
    run(&["config", "user.email", "test@test.com"]);
    run(&["config", "user.name", "Test User"]);
    run(&["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Site")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    run(&["add", "."]);
    run(&["commit", "-m", "Initial commit"]);
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
}

/// Number of commits reachable from HEAD.
pub fn commit_count(path: &Path) -> usize {
    let repo = git2::Repository::open(path).expect("commit_count: open repository");
    let mut walk = repo.revwalk().expect("commit_count: revwalk");
    walk.push_head().expect("commit_count: push HEAD");
    walk.count()
}

/// Subject line of the HEAD commit.
pub fn head_message(path: &Path) -> String {
    let repo = git2::Repository::open(path).expect("head_message: open repository");
    let commit = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .expect("head_message: HEAD commit");
    commit.summary().unwrap_or_default().to_string()
}
