//! Tests for the commit stage against real repositories

use std::fs;

use photo_git::{CommitStage, Error, is_git_repo};
use photo_test_utils::git::{real_git_repo, real_git_repo_with_commit};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn detects_repositories() {
    let temp = TempDir::new().unwrap();
    assert!(!is_git_repo(temp.path()));

    real_git_repo(temp.path());
    assert!(is_git_repo(temp.path()));
}

#[test]
fn open_rejects_plain_directory() {
    let temp = TempDir::new().unwrap();
    let err = CommitStage::open(temp.path()).err().unwrap();
    assert!(matches!(err, Error::NotARepository { .. }));
}

#[test]
fn commit_paths_creates_commit_with_exported_files() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());

    let photo = temp.path().join("src/assets/photos/eagles/game-day/IMG_1.jpg");
    fs::create_dir_all(photo.parent().unwrap()).unwrap();
    fs::write(&photo, b"jpeg bytes").unwrap();

    let stage = CommitStage::open(temp.path()).unwrap();
    let info = stage
        .commit_paths(&[photo], "gallery: sync 1 photos from Game Day")
        .unwrap()
        .expect("a commit should be created");

    assert_eq!(info.hash.len(), 7);
    assert_eq!(info.message, "gallery: sync 1 photos from Game Day");
    assert!(stage.status().unwrap().is_empty());
}

#[test]
fn commit_without_changes_returns_none() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());

    let stage = CommitStage::open(temp.path()).unwrap();
    let readme = temp.path().join("README.md");

    assert!(stage.commit_paths(&[readme], "noop").unwrap().is_none());
    assert!(stage.commit_paths(&[], "noop").unwrap().is_none());
}

#[test]
fn stage_rejects_paths_outside_worktree() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());
    let stray = outside.path().join("stray.jpg");
    fs::write(&stray, b"x").unwrap();

    let stage = CommitStage::open(temp.path()).unwrap();
    let err = stage.stage(&[stray]).unwrap_err();
    assert!(matches!(err, Error::PathOutsideRepo { .. }));
}

#[test]
fn status_reports_untracked_files() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());
    fs::write(temp.path().join("new.jpg"), b"x").unwrap();

    let stage = CommitStage::open(temp.path()).unwrap();
    let status = stage.status().unwrap();

    assert_eq!(status.len(), 1);
    assert_eq!(status[0].code, "??");
    assert_eq!(status[0].path, "new.jpg");
}

#[test]
fn push_without_remote_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());

    let stage = CommitStage::open(temp.path()).unwrap();
    let err = stage.push("origin").unwrap_err();
    assert!(matches!(err, Error::RemoteNotFound { .. }));
}
