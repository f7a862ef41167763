use std::sync::Arc;

use super::executor::{ExecutionReport, Executor, ProgressFn};
use super::plan::{SyncOptions, SyncPlan, SyncPlanner};
use crate::config::Config;
use crate::exporter::{Exporter, ImageExporter};
use crate::mapping::{MappingConflict, Resolution};
use crate::provider::{Album, PhotoProvider, ProviderRegistry};
use crate::state::StateStore;
use crate::Result;

/// An album and how it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumMapping {
    pub album: Album,
    pub resolution: Resolution,
}

/// Every album with its resolution, plus any mapping conflicts.
#[derive(Debug, Clone, Default)]
pub struct AlbumListing {
    pub mappings: Vec<AlbumMapping>,
    pub conflicts: Vec<MappingConflict>,
}

/// Wires configuration, provider, exporter and state together for one run.
pub struct SyncEngine {
    config: Config,
    provider: Box<dyn PhotoProvider>,
    exporter: Arc<dyn Exporter>,
    state: Arc<StateStore>,
    progress: Option<Arc<ProgressFn>>,
}

impl SyncEngine {
    /// Create an engine; the state store is opened immediately so an
    /// unreadable or corrupt store fails before any planning.
    pub fn new(
        config: Config,
        provider: Box<dyn PhotoProvider>,
        exporter: Arc<dyn Exporter>,
    ) -> Result<Self> {
        let state = Arc::new(StateStore::open(&config.state_path)?);
        Ok(Self {
            config,
            provider,
            exporter,
            state,
            progress: None,
        })
    }

    /// Engine using the configured provider and the image exporter.
    pub fn from_config(config: Config, registry: &ProviderRegistry) -> Result<Self> {
        let provider = registry.create(&config.provider)?;
        Self::new(config, provider, Arc::new(ImageExporter::new()))
    }

    pub fn with_progress(mut self, progress: Arc<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn provider(&self) -> &dyn PhotoProvider {
        self.provider.as_ref()
    }

    /// Resolve every provider album without failing on conflicts.
    pub fn list_albums(&self) -> Result<AlbumListing> {
        let albums = self.provider.list_albums()?;
        let conflicts = self.config.mapping.conflicts(&albums);
        let mappings = albums
            .into_iter()
            .map(|album| {
                let resolution = self.config.mapping.resolve(&album.name);
                AlbumMapping { album, resolution }
            })
            .collect();
        Ok(AlbumListing {
            mappings,
            conflicts,
        })
    }

    /// Enumerate the provider and plan a run.
    pub fn plan(&self, options: &SyncOptions) -> Result<SyncPlan> {
        let albums = self.provider.list_albums()?;
        tracing::debug!(provider = self.provider.name(), albums = albums.len(), "Enumerated albums");
        SyncPlanner::new(
            &self.config.mapping,
            &self.state,
            &self.config.output_template,
            &self.config.export,
        )
        .plan(self.provider.as_ref(), &albums, options)
    }

    /// Plan, then execute (or render, under dry run).
    pub async fn run(&self, options: &SyncOptions) -> Result<(SyncPlan, ExecutionReport)> {
        let plan = self.plan(options)?;
        let executor = self.executor();
        let report = if options.dry_run {
            executor.render(&plan)
        } else {
            executor.execute(&plan).await?
        };
        Ok((plan, report))
    }

    fn executor(&self) -> Executor {
        let executor = Executor::new(
            Arc::clone(&self.exporter),
            Arc::clone(&self.state),
            self.config.output_root(),
            self.config.export.clone(),
            self.config.workers,
        );
        match &self.progress {
            Some(progress) => executor.with_progress(Arc::clone(progress)),
            None => executor,
        }
    }
}
