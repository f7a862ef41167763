//! Photo providers
//!
//! A provider enumerates albums and their photos from some photo library.
//! Providers are read-only to the engine and selected by name through a
//! [`ProviderRegistry`].

mod folder;
mod registry;

pub use folder::FolderProvider;
pub use registry::{ProviderFactory, ProviderRegistry};

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Result;

/// Metadata read from the source without decoding the full image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhotoMetadata {
    pub captured_at: Option<DateTime<Utc>>,
    /// `None` when the provider cannot tell
    pub has_gps: Option<bool>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One photo as seen by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    /// Provider-native id, opaque to the engine
    pub id: String,
    /// Original filename, used to derive the output filename
    pub filename: String,
    pub source_path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    /// Provider edit revision, if the library tracks one
    pub revision: Option<String>,
    /// Ids of every album containing this photo
    pub albums: BTreeSet<String>,
    pub metadata: PhotoMetadata,
}

/// An album and its ordered membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub photo_ids: Vec<String>,
}

/// A source of albums and photos.
pub trait PhotoProvider: Send + Sync {
    /// Registry name of this provider
    fn name(&self) -> &str;

    /// Albums in the provider's enumeration order.
    fn list_albums(&self) -> Result<Vec<Album>>;

    /// Photos of one album.
    fn list_photos(&self, album_id: &str) -> Result<Vec<Photo>>;

    /// Cheap change detector for a photo.
    ///
    /// Built from file identity only (size, modification time and edit
    /// revision); the content is never read.
    fn fingerprint(&self, photo: &Photo) -> String {
        identity_fingerprint(photo)
    }
}

/// `sha256:` hash of `size:mtime_nanos:revision`.
pub fn identity_fingerprint(photo: &Photo) -> String {
    let nanos = photo
        .modified
        .timestamp_nanos_opt()
        .unwrap_or_else(|| photo.modified.timestamp_micros());
    photo_fs::compute_content_checksum(&format!(
        "{}:{}:{}",
        photo.size_bytes,
        nanos,
        photo.revision.as_deref().unwrap_or("")
    ))
}
