use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable proof that one photo was exported, with given parameters, to a
/// given path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Provider photo id, the primary key
    pub photo_id: String,
    /// Album the photo was exported through
    pub album: String,
    pub category: String,
    /// Output path relative to the output base, forward slashes
    pub output_path: String,
    /// Source fingerprint at export time
    pub fingerprint: String,
    /// [`ExportParams::hash`](crate::config::ExportParams::hash) at export time
    pub params_hash: String,
    /// `sha256:` checksum of the written file
    pub checksum: String,
    pub synced_at: DateTime<Utc>,
}
