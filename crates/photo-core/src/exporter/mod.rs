//! Photo exporters
//!
//! An exporter materializes one photo at an output path. It must be a pure
//! function of the source content and [`ExportParams`]: exporting the same
//! photo twice with the same parameters yields the same file.

mod image_exporter;

pub use image_exporter::ImageExporter;

use std::path::{Path, PathBuf};

use crate::config::ExportParams;
use crate::provider::Photo;

/// Per-photo export failure. Never aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Source could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source could not be decoded as an image
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Encoding the output failed
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Writing or renaming the output failed
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Output was not on disk after the exporter reported success
    #[error("Export reported success but {path} is missing")]
    Unverified { path: PathBuf },

    /// Output path is outside the output root
    #[error("Refusing to write outside the output root: {message}")]
    OutputPath { message: String },

    /// The export task itself died
    #[error("Export task failed: {message}")]
    Task { message: String },
}

/// A file the exporter finished writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    /// `sha256:` checksum of the written bytes
    pub checksum: String,
    pub width: u32,
    pub height: u32,
}

/// Materializes photos on disk.
pub trait Exporter: Send + Sync {
    /// Write `photo` to `output` using `params`.
    ///
    /// Parent directories are created as needed. On success the file is fully
    /// written and renamed into place.
    fn export(
        &self,
        photo: &Photo,
        output: &Path,
        params: &ExportParams,
    ) -> Result<ExportedFile, ExportError>;
}
