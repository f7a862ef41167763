//! Sync engine output handed to the commit stage, across crates.

use photo_core::provider::ProviderRegistry;
use photo_core::sync::SyncOptions;
use photo_core::{Config, SyncEngine};
use photo_git::{CommitStage, render_commit_message};
use photo_test_utils::git::{commit_count, head_message};
use photo_test_utils::library::PhotoLibrary;
use photo_test_utils::site::TestSite;

const RULES: &str = r#"
[[sync.patterns]]
pattern = "Eagles.*"
category = "eagles"

[[sync.patterns]]
pattern = "Sail.*"
category = "sailing"
"#;

fn engine(site: &TestSite, library: &PhotoLibrary) -> SyncEngine {
    let config = Config::load(&site.write_config(library.root(), RULES)).unwrap();
    SyncEngine::from_config(config, &ProviderRegistry::with_builtins()).unwrap()
}

async fn sync_and_commit(engine: &SyncEngine) -> Option<photo_git::CommitInfo> {
    let (_, report) = engine.run(&SyncOptions::default()).await.unwrap();
    let paths = report.exported_paths();
    let message = render_commit_message(
        &engine.config().git.commit_message,
        paths.len(),
        &report.albums_with_exports(),
    );
    CommitStage::open(&engine.config().repo_path)
        .unwrap()
        .commit_paths(&paths, &message)
        .unwrap()
}

#[tokio::test]
async fn only_written_files_are_committed() {
    let site = TestSite::new();
    let library = PhotoLibrary::new()
        .with_photo("Eagles Home", "a.png", 12, 12)
        .with_photo("Sail Day", "b.png", 12, 12)
        .with_photo("Birthday", "c.png", 12, 12);
    std::fs::write(site.repo_path().join("draft.md"), "unrelated edit").unwrap();
    let engine = engine(&site, &library);

    let commit = sync_and_commit(&engine).await.unwrap();

    assert_eq!(commit.message, "gallery: sync 2 photos from Eagles Home, Sail Day");
    let stage = CommitStage::open(site.repo_path()).unwrap();
    let dirty: Vec<_> = stage.status().unwrap().into_iter().map(|e| e.path).collect();
    assert_eq!(dirty, vec!["draft.md".to_string()]);
}

#[tokio::test]
async fn converged_run_makes_no_commit() {
    let site = TestSite::new();
    let library = PhotoLibrary::new().with_photo("Eagles Home", "a.png", 12, 12);
    let engine = engine(&site, &library);

    assert!(sync_and_commit(&engine).await.is_some());
    assert!(sync_and_commit(&engine).await.is_none());
    assert_eq!(commit_count(site.repo_path()), 2);
}

#[tokio::test]
async fn edit_produces_a_second_commit_for_that_photo() {
    let site = TestSite::new();
    let library = PhotoLibrary::new()
        .with_photo("Sail Day", "a.png", 12, 12)
        .with_photo("Sail Day", "b.png", 12, 12);
    let engine = engine(&site, &library);
    sync_and_commit(&engine).await.unwrap();

    library.edit_photo("Sail Day", "a.png");
    let commit = sync_and_commit(&engine).await.unwrap();

    assert_eq!(commit.message, "gallery: sync 1 photos from Sail Day");
    assert_eq!(head_message(site.repo_path()), commit.message);
    assert!(site.output_file("sailing/sail-day/a.jpg").is_file());
}
