//! Error types for photo-core
//!
//! Configuration and state-store errors are fatal and surface before any
//! export runs. Per-photo export failures use [`crate::exporter::ExportError`]
//! and never leave the executor; they are aggregated into the report.

use std::path::PathBuf;

/// Result type for photo-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in photo-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}. Run `photo-sync init` to create one.")]
    ConfigNotFound { path: PathBuf },

    /// Configuration is malformed or has invalid values
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A required configuration key is absent
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// A pattern rule does not compile
    #[error("Invalid album pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Two albums resolve to the same gallery location
    #[error(
        "Albums {first:?} and {second:?} both map to {category}/{slug}; give one of them an explicit slug"
    )]
    MappingConflict {
        first: String,
        second: String,
        category: String,
        slug: String,
    },

    /// Provider kind is not registered
    #[error("Unknown provider '{kind}' (available: {available})")]
    UnknownProvider { kind: String, available: String },

    /// Sync state is unreadable, corrupt or could not be written
    #[error("State store error at {path}: {message}")]
    StateStore { path: PathBuf, message: String },

    /// The photo provider failed
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Requested album does not exist in the provider
    #[error("Album not found: {name}")]
    AlbumNotFound { name: String },

    /// Output path template rendered something unusable
    #[error("Invalid output path: {message}")]
    OutputPath { message: String },

    /// Filesystem error from photo-fs
    #[error(transparent)]
    Fs(#[from] photo_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn state(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::StateStore {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// True for errors that mean the configuration must be fixed before a run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::Config { .. }
                | Self::MissingField { .. }
                | Self::InvalidPattern { .. }
                | Self::MappingConflict { .. }
                | Self::UnknownProvider { .. }
                | Self::OutputPath { .. }
        )
    }
}
