//! Planning and execution of sync runs
//!
//! [`SyncPlanner`] turns provider albums into an ordered [`SyncPlan`];
//! [`Executor`] applies it; [`SyncEngine`] wires both to configuration.

mod engine;
mod executor;
mod plan;

pub use engine::{AlbumListing, AlbumMapping, SyncEngine};
pub use executor::{
    EntryReport, EntryStatus, ExecutionReport, Executor, ProgressFn, ReportCounts,
};
pub use plan::{
    Action, AlbumFilter, PlanCounts, PlanEntry, PlannedTarget, Reason, SyncOptions, SyncPlan,
    SyncPlanner, decide,
};
