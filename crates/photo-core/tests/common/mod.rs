//! Shared fixtures for photo-core integration tests
#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use photo_core::config::{Config, ExportParams};
use photo_core::exporter::{ExportError, ExportedFile, Exporter};
use photo_core::provider::{Album, Photo, PhotoMetadata, PhotoProvider};
use photo_core::{Result, SyncEngine};

/// Build a photo with a fixed identity.
pub fn photo(id: &str, filename: &str) -> Photo {
    Photo {
        id: id.to_string(),
        filename: filename.to_string(),
        source_path: PathBuf::from(format!("/library/{filename}")),
        size_bytes: 1000,
        modified: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        revision: None,
        albums: BTreeSet::new(),
        metadata: PhotoMetadata::default(),
    }
}

#[derive(Default)]
struct Library {
    albums: Vec<Album>,
    photos: Vec<Photo>,
}

/// In-memory provider; clones share the same library so tests can mutate it
/// after handing a clone to the engine.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<Mutex<Library>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an album (id == name) whose photos are `filenames`, with photo ids
    /// `"<album>/<filename>"`.
    pub fn with_album(self, name: &str, filenames: &[&str]) -> Self {
        {
            let mut lib = self.inner.lock().unwrap();
            let mut ids = Vec::new();
            for filename in filenames {
                let id = format!("{name}/{filename}");
                let mut p = photo(&id, filename);
                p.albums.insert(name.to_string());
                lib.photos.push(p);
                ids.push(id);
            }
            lib.albums.push(Album {
                id: name.to_string(),
                name: name.to_string(),
                photo_ids: ids,
            });
        }
        self
    }

    /// Add an existing photo to another album, at the end of its membership.
    pub fn share(self, photo_id: &str, album: &str) -> Self {
        {
            let mut lib = self.inner.lock().unwrap();
            if let Some(p) = lib.photos.iter_mut().find(|p| p.id == photo_id) {
                p.albums.insert(album.to_string());
            }
            if let Some(a) = lib.albums.iter_mut().find(|a| a.id == album) {
                a.photo_ids.push(photo_id.to_string());
            }
        }
        self
    }

    /// Simulate an edit in the photo library.
    pub fn edit(&self, photo_id: &str) {
        let mut lib = self.inner.lock().unwrap();
        let p = lib.photos.iter_mut().find(|p| p.id == photo_id).unwrap();
        let next = p.revision.as_deref().map_or(1, |r| r.parse::<u32>().unwrap() + 1);
        p.revision = Some(next.to_string());
    }

    /// Add a new photo at the end of an existing album.
    pub fn add(&self, album: &str, filename: &str) {
        let mut lib = self.inner.lock().unwrap();
        let id = format!("{album}/{filename}");
        let mut p = photo(&id, filename);
        p.albums.insert(album.to_string());
        lib.photos.push(p);
        if let Some(a) = lib.albums.iter_mut().find(|a| a.id == album) {
            a.photo_ids.push(id);
        }
    }

    /// Drop a photo from an album and from the library.
    pub fn remove(&self, photo_id: &str) {
        let mut lib = self.inner.lock().unwrap();
        lib.photos.retain(|p| p.id != photo_id);
        for album in &mut lib.albums {
            album.photo_ids.retain(|id| id != photo_id);
        }
    }
}

impl PhotoProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_albums(&self) -> Result<Vec<Album>> {
        Ok(self.inner.lock().unwrap().albums.clone())
    }

    fn list_photos(&self, album_id: &str) -> Result<Vec<Photo>> {
        let lib = self.inner.lock().unwrap();
        Ok(lib
            .photos
            .iter()
            .filter(|p| p.albums.contains(album_id))
            .cloned()
            .collect())
    }
}

/// Exporter that writes a small marker file and fails on chosen photo ids.
#[derive(Clone, Default)]
pub struct ScriptedExporter {
    fail_on: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, photo_id: &str) -> Self {
        self.fail_on.lock().unwrap().insert(photo_id.to_string());
        self
    }

    pub fn heal(&self) {
        self.fail_on.lock().unwrap().clear();
    }

    /// Photo ids passed to `export`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Exporter for ScriptedExporter {
    fn export(
        &self,
        photo: &Photo,
        output: &Path,
        params: &ExportParams,
    ) -> std::result::Result<ExportedFile, ExportError> {
        self.calls.lock().unwrap().push(photo.id.clone());
        if self.fail_on.lock().unwrap().contains(&photo.id) {
            return Err(ExportError::Decode {
                path: photo.source_path.clone(),
                message: "scripted failure".to_string(),
            });
        }
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        let content = format!("{}|{}", photo.id, params.hash());
        std::fs::write(output, &content).unwrap();
        Ok(ExportedFile {
            path: output.to_path_buf(),
            checksum: photo_fs::compute_content_checksum(&content),
            width: 1,
            height: 1,
        })
    }
}

/// A site directory and state path inside one temp dir.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn site(&self) -> PathBuf {
        self.dir.path().join("site")
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state").join("state.redb")
    }

    pub fn output_root(&self) -> PathBuf {
        self.site().join("src/assets/photos")
    }

    /// Config with default export settings plus `extra` TOML.
    pub fn config(&self, extra: &str) -> Config {
        Config::parse(&format!(
            "[general]\nrepo_path = {:?}\nstate_path = {:?}\nworkers = 2\n\n{extra}\n",
            self.site().display().to_string(),
            self.state_path().display().to_string(),
        ))
        .unwrap()
    }

    pub fn engine(
        &self,
        extra: &str,
        provider: &MemoryProvider,
        exporter: &ScriptedExporter,
    ) -> SyncEngine {
        self.try_engine(extra, provider, exporter).unwrap()
    }

    pub fn try_engine(
        &self,
        extra: &str,
        provider: &MemoryProvider,
        exporter: &ScriptedExporter,
    ) -> Result<SyncEngine> {
        SyncEngine::new(
            self.config(extra),
            Box::new(provider.clone()),
            Arc::new(exporter.clone()),
        )
    }

    /// Every file under the output root, relative, sorted.
    pub fn output_files(&self) -> Vec<String> {
        let root = self.output_root();
        if !root.exists() {
            return Vec::new();
        }
        let mut files: Vec<String> = walkdir::WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(&root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

/// Mapping used by most tests: two pattern categories and one explicit album.
pub const RULES: &str = r#"
[sync.albums."Eagles vs Giants"]
category = "eagles"
slug = "2024-giants"

[[sync.patterns]]
pattern = "Eagles.*"
category = "eagles"

[[sync.patterns]]
pattern = "Sail.*"
category = "sailing"
"#;
