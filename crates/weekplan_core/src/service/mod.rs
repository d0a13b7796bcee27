//! Planner use-case services.
//!
//! # Responsibility
//! - `week_store`: stateful edits with write-through persistence.
//! - `history`: pure read-side projections for archive and statistics views.

pub mod history;
pub mod week_store;
