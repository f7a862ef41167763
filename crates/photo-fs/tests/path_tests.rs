use assert_fs::prelude::*;
use photo_fs::{Error, resolve_within};
use rstest::rstest;

#[rstest]
#[case("../outside.jpg")]
#[case("eagles/../../outside.jpg")]
#[case("/etc/passwd")]
#[case("")]
fn resolve_within_rejects_unsafe_relative_paths(#[case] relative: &str) {
    let temp = assert_fs::TempDir::new().unwrap();

    let err = resolve_within(temp.path(), relative).unwrap_err();
    assert!(matches!(err, Error::PathTraversal { .. }));
}

#[test]
fn resolve_within_accepts_nested_paths_that_do_not_exist_yet() {
    let temp = assert_fs::TempDir::new().unwrap();

    let resolved = resolve_within(temp.path(), "eagles/game-day/IMG_1.jpg").unwrap();
    assert_eq!(resolved, temp.path().join("eagles/game-day/IMG_1.jpg"));
}

#[test]
fn resolve_within_allows_missing_base() {
    let temp = assert_fs::TempDir::new().unwrap();
    let base = temp.path().join("not-created");

    let resolved = resolve_within(&base, "a/b.jpg").unwrap();
    assert_eq!(resolved, base.join("a/b.jpg"));
}

#[cfg(unix)]
#[test]
fn resolve_within_rejects_symlink_escaping_base() {
    let temp = assert_fs::TempDir::new().unwrap();
    let outside = assert_fs::TempDir::new().unwrap();
    let base = temp.child("photos");
    base.create_dir_all().unwrap();
    std::os::unix::fs::symlink(outside.path(), base.path().join("eagles")).unwrap();

    let err = resolve_within(base.path(), "eagles/IMG_1.jpg").unwrap_err();
    assert!(matches!(err, Error::PathEscape { .. }));
}
