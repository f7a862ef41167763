//! Plan execution
//!
//! Exports run on a bounded pool of blocking tasks. Results are consumed by
//! a single loop which is the only writer to the state store, so records are
//! committed one at a time and only after the output file is confirmed on
//! disk.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::stream;

use super::plan::{Action, PlanEntry, Reason, SyncPlan};
use crate::config::ExportParams;
use crate::exporter::{ExportError, ExportedFile, Exporter};
use crate::provider::Photo;
use crate::state::{StateStore, SyncRecord};
use crate::Result;

/// Callback invoked once per finished export entry.
pub type ProgressFn = dyn Fn(&EntryReport) + Send + Sync;

/// Outcome of one plan entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Written and recorded
    Exported { checksum: String },
    /// Dry run: would have been exported
    WouldExport,
    Skipped,
    Unmapped,
    /// Export failed; no record was written
    Failed { error: String },
}

/// Report line for one plan entry, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub album: String,
    pub photo_id: Option<String>,
    /// Relative to the output base
    pub output_path: Option<String>,
    /// Absolute path of the file written in this run
    pub written: Option<PathBuf>,
    pub action: Action,
    pub reason: Reason,
    pub status: EntryStatus,
}

impl EntryReport {
    fn from_entry(entry: &PlanEntry, status: EntryStatus) -> Self {
        Self {
            album: entry.album_name.clone(),
            photo_id: entry.photo_id().map(str::to_string),
            output_path: entry
                .target
                .as_ref()
                .map(|t| t.output_path.as_str().to_string()),
            written: None,
            action: entry.action,
            reason: entry.reason.clone(),
            status,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, EntryStatus::Failed { .. })
    }
}

/// Totals by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCounts {
    pub exported: usize,
    pub would_export: usize,
    pub skipped: usize,
    pub unmapped: usize,
    pub failed: usize,
}

/// Result of executing (or rendering) a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub entries: Vec<EntryReport>,
    pub dry_run: bool,
}

impl ExecutionReport {
    pub fn counts(&self) -> ReportCounts {
        let mut counts = ReportCounts::default();
        for entry in &self.entries {
            match entry.status {
                EntryStatus::Exported { .. } => counts.exported += 1,
                EntryStatus::WouldExport => counts.would_export += 1,
                EntryStatus::Skipped => counts.skipped += 1,
                EntryStatus::Unmapped => counts.unmapped += 1,
                EntryStatus::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }

    /// Files written and recorded in this run, for the commit stage.
    pub fn exported_paths(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Exported { .. }))
            .filter_map(|e| e.written.clone())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.is_failure())
    }

    /// Albums with at least one exported photo, first-seen order.
    pub fn albums_with_exports(&self) -> Vec<String> {
        let mut albums: Vec<String> = Vec::new();
        for entry in &self.entries {
            if matches!(entry.status, EntryStatus::Exported { .. })
                && !albums.contains(&entry.album)
            {
                albums.push(entry.album.clone());
            }
        }
        albums
    }

    /// True when no entry failed.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

struct Job {
    index: usize,
    photo: Photo,
    output: PathBuf,
    pending: PendingRecord,
}

/// Record fields known before the export runs.
struct PendingRecord {
    photo_id: String,
    album: String,
    category: String,
    output_path: String,
    fingerprint: String,
}

/// Applies a [`SyncPlan`].
pub struct Executor {
    exporter: Arc<dyn Exporter>,
    state: Arc<StateStore>,
    output_root: PathBuf,
    params: ExportParams,
    workers: usize,
    progress: Option<Arc<ProgressFn>>,
}

impl Executor {
    pub fn new(
        exporter: Arc<dyn Exporter>,
        state: Arc<StateStore>,
        output_root: PathBuf,
        params: ExportParams,
        workers: usize,
    ) -> Self {
        Self {
            exporter,
            state,
            output_root,
            params,
            workers: workers.max(1),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Report what [`execute`](Self::execute) would do without touching the
    /// filesystem or the state store.
    pub fn render(&self, plan: &SyncPlan) -> ExecutionReport {
        let entries = plan
            .entries
            .iter()
            .map(|entry| {
                let status = match entry.action {
                    Action::Export => EntryStatus::WouldExport,
                    Action::Skip => EntryStatus::Skipped,
                    Action::Unmapped => EntryStatus::Unmapped,
                };
                EntryReport::from_entry(entry, status)
            })
            .collect();
        ExecutionReport {
            entries,
            dry_run: true,
        }
    }

    /// Export every `export` entry and commit a record for each success.
    ///
    /// Per-photo failures are reported and the run continues. Exports are
    /// dispatched in plan order and the report is in plan order.
    ///
    /// # Errors
    ///
    /// Only a failed state store write aborts the run.
    pub async fn execute(&self, plan: &SyncPlan) -> Result<ExecutionReport> {
        let mut entries: Vec<EntryReport> = Vec::with_capacity(plan.entries.len());
        let mut jobs = Vec::new();

        for (index, entry) in plan.entries.iter().enumerate() {
            let status = match entry.action {
                Action::Skip => EntryStatus::Skipped,
                Action::Unmapped => EntryStatus::Unmapped,
                Action::Export => match self.prepare(index, entry) {
                    Ok(job) => {
                        jobs.push(job);
                        // Placeholder until the export completes
                        EntryStatus::WouldExport
                    }
                    Err(e) => {
                        tracing::warn!(photo_id = ?entry.photo_id(), album = %entry.album_name, error = %e, "Export failed");
                        EntryStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };
            entries.push(EntryReport::from_entry(entry, status));
        }

        tracing::info!(exports = jobs.len(), workers = self.workers, "Executing sync plan");

        let mut results = stream::iter(jobs)
            .map(|job| {
                let exporter = Arc::clone(&self.exporter);
                let params = self.params.clone();
                async move {
                    let Job {
                        index,
                        photo,
                        output,
                        pending,
                    } = job;
                    let joined = tokio::task::spawn_blocking(move || {
                        exporter.export(&photo, &output, &params)
                    })
                    .await;
                    let result = joined.unwrap_or_else(|e| {
                        Err(ExportError::Task {
                            message: e.to_string(),
                        })
                    });
                    (index, pending, result)
                }
            })
            .buffer_unordered(self.workers);

        while let Some((index, pending, result)) = results.next().await {
            let entry = &plan.entries[index];
            let report = &mut entries[index];
            match result.and_then(verify) {
                Ok(file) => {
                    self.commit(pending, &file)?;
                    tracing::info!(photo_id = ?entry.photo_id(), output = %file.path.display(), "Exported and recorded");
                    report.status = EntryStatus::Exported {
                        checksum: file.checksum,
                    };
                    report.written = Some(file.path);
                }
                Err(e) => {
                    tracing::warn!(photo_id = ?entry.photo_id(), album = %entry.album_name, error = %e, "Export failed");
                    report.status = EntryStatus::Failed {
                        error: e.to_string(),
                    };
                }
            }
            if let Some(progress) = &self.progress {
                progress(report);
            }
        }

        let report = ExecutionReport {
            entries,
            dry_run: false,
        };
        let counts = report.counts();
        tracing::info!(
            exported = counts.exported,
            skipped = counts.skipped,
            unmapped = counts.unmapped,
            failed = counts.failed,
            "Sync finished"
        );
        Ok(report)
    }

    fn prepare(&self, index: usize, entry: &PlanEntry) -> std::result::Result<Job, ExportError> {
        let (Some(photo), Some(target), Some(fingerprint)) =
            (&entry.photo, &entry.target, &entry.fingerprint)
        else {
            return Err(ExportError::OutputPath {
                message: "export entry without a resolved photo target".to_string(),
            });
        };
        let output = photo_fs::resolve_within(&self.output_root, target.output_path.as_str())
            .map_err(|e| ExportError::OutputPath {
                message: e.to_string(),
            })?;
        Ok(Job {
            index,
            photo: photo.clone(),
            output,
            pending: PendingRecord {
                photo_id: photo.id.clone(),
                album: entry.album_name.clone(),
                category: target.category.clone(),
                output_path: target.output_path.as_str().to_string(),
                fingerprint: fingerprint.clone(),
            },
        })
    }

    fn commit(&self, pending: PendingRecord, file: &ExportedFile) -> Result<()> {
        self.state.put(SyncRecord {
            photo_id: pending.photo_id,
            album: pending.album,
            category: pending.category,
            output_path: pending.output_path,
            fingerprint: pending.fingerprint,
            params_hash: self.params.hash(),
            checksum: file.checksum.clone(),
            synced_at: Utc::now(),
        })
    }
}

fn verify(file: ExportedFile) -> std::result::Result<ExportedFile, ExportError> {
    if file.path.is_file() {
        Ok(file)
    } else {
        Err(ExportError::Unverified { path: file.path })
    }
}
