use assert_fs::prelude::*;
use photo_fs::{read_text, temp_path_for, write_atomic};
use predicates::prelude::*;

#[test]
fn write_atomic_creates_parent_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("nested/state/state.toml");

    write_atomic(target.path(), b"version = \"1\"\n").unwrap();

    target.assert(predicate::str::contains("version"));
}

#[test]
fn write_atomic_replaces_existing_content_without_leftovers() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("state.toml");
    target.write_str("old").unwrap();

    write_atomic(target.path(), b"new").unwrap();

    target.assert("new");
    assert!(!temp_path_for(target.path()).exists());
}

#[test]
fn read_text_round_trips_written_content() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("notes.txt");

    write_atomic(target.path(), "gallery".as_bytes()).unwrap();

    assert_eq!(read_text(target.path()).unwrap(), "gallery");
}

#[test]
fn read_text_reports_missing_file_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.child("absent.toml");

    let err = read_text(missing.path()).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
