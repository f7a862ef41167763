//! Plain directory tree provider
//!
//! Every direct, non-hidden subdirectory of `provider.root` is an album named
//! after the directory; the image files inside it are its photos, ordered by
//! filename.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::{DirEntry, WalkDir};

use super::{Album, Photo, PhotoMetadata, PhotoProvider};
use crate::config::{ProviderConfig, expand_home};
use crate::{Error, Result};

const PHOTO_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "tif", "tiff", "gif", "bmp"];

/// Reads albums from a directory tree.
#[derive(Debug, Clone)]
pub struct FolderProvider {
    root: PathBuf,
}

impl FolderProvider {
    pub const KIND: &'static str = "folder";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build from `[provider]`; requires `root`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let root = config.require_str("root")?;
        Ok(Self::new(expand_home(root)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::provider(format!(
                "library root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn album_dir(&self, album_id: &str) -> Result<PathBuf> {
        let valid = !album_id.is_empty()
            && !album_id.contains(['/', '\\'])
            && album_id != "."
            && album_id != "..";
        let dir = self.root.join(album_id);
        if !valid || !dir.is_dir() {
            return Err(Error::AlbumNotFound {
                name: album_id.to_string(),
            });
        }
        Ok(dir)
    }

    fn photo_entries(dir: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::provider(e.to_string()))?;
            if entry.file_type().is_file() && !is_hidden(&entry) && is_photo(entry.path()) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

impl PhotoProvider for FolderProvider {
    fn name(&self) -> &str {
        Self::KIND
    }

    fn list_albums(&self) -> Result<Vec<Album>> {
        self.ensure_root()?;

        let mut albums = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::provider(e.to_string()))?;
            if !entry.file_type().is_dir() || is_hidden(&entry) {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!(path = %entry.path().display(), "Skipping album with non-UTF-8 name");
                continue;
            };
            let photo_ids = Self::photo_entries(entry.path())?
                .iter()
                .filter_map(|e| e.file_name().to_str().map(|f| photo_id(name, f)))
                .collect();
            albums.push(Album {
                id: name.to_string(),
                name: name.to_string(),
                photo_ids,
            });
        }

        tracing::debug!(root = %self.root.display(), albums = albums.len(), "Listed folder albums");
        Ok(albums)
    }

    fn list_photos(&self, album_id: &str) -> Result<Vec<Photo>> {
        let dir = self.album_dir(album_id)?;

        let mut photos = Vec::new();
        for entry in Self::photo_entries(&dir)? {
            let Some(filename) = entry.file_name().to_str() else {
                continue;
            };
            let meta = entry
                .metadata()
                .map_err(|e| Error::provider(format!("{}: {e}", entry.path().display())))?;
            let modified: DateTime<Utc> = meta.modified()?.into();
            // Undecodable files still get listed; the exporter reports them.
            let (width, height) = match image::image_dimensions(entry.path()) {
                Ok((w, h)) => (Some(w), Some(h)),
                Err(_) => (None, None),
            };

            photos.push(Photo {
                id: photo_id(album_id, filename),
                filename: filename.to_string(),
                source_path: entry.path().to_path_buf(),
                size_bytes: meta.len(),
                modified,
                revision: None,
                albums: BTreeSet::from([album_id.to_string()]),
                metadata: PhotoMetadata {
                    captured_at: None,
                    has_gps: None,
                    width,
                    height,
                },
            });
        }
        Ok(photos)
    }
}

fn photo_id(album: &str, filename: &str) -> String {
    format!("{album}/{filename}")
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PHOTO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
