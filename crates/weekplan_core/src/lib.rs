//! Core state store for the weekly planner.
//!
//! Owns week identity, data migration, write-through persistence and the
//! archive projections. Front-ends only render what this crate returns and
//! send edits back through `WeekStore`.

pub mod db;
pub mod logging;
pub mod migration;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use migration::{migrate, MigrationReport, SourceLayout};
pub use model::planner::{
    Day, Energy, HabitName, HabitPreset, HabitTemplate, Labeled, Mood, PlannerState, Task, Theme,
    Week,
};
pub use model::week_key::{canonical_week_key, WeekKey, DAYS_PER_WEEK};
pub use repo::state_repo::{RepoError, RepoResult, SqliteStateRepository, StateRepository};
pub use service::history::{summarize, week_progress, WeekProgress, WeekSummary};
pub use service::week_store::{StoreError, StoreResult, WeekStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
