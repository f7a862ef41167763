//! Sync planning and state engine for photo-sync
//!
//! Mirrors photo-library albums into a static-site file tree:
//!
//! - [`mapping`]: album name to `(category, slug)` resolution
//! - [`state`]: durable record of every exported photo
//! - [`sync`]: planner, executor and the [`SyncEngine`] wiring them
//! - [`provider`] and [`exporter`]: the I/O collaborators
//! - [`config`]: `config.toml` loading and validation
//!
//! Runs are incremental and idempotent: only new or changed photos are
//! exported, and a record is committed only after its file is on disk.

pub mod config;
pub mod error;
pub mod exporter;
pub mod mapping;
pub mod provider;
pub mod state;
pub mod sync;

pub use config::{Config, ExportParams};
pub use error::{Error, Result};
pub use exporter::{ExportError, Exporter, ImageExporter};
pub use mapping::{GalleryTarget, MappingResolver, Resolution};
pub use provider::{Album, Photo, PhotoProvider, ProviderRegistry};
pub use state::{StateStore, SyncRecord};
pub use sync::{ExecutionReport, SyncEngine, SyncOptions, SyncPlan};
