//! Planner domain model.
//!
//! # Responsibility
//! - Define week identity (`week_key`) and the records stored per week
//!   (`planner`).
//!
//! # Invariants
//! - Weeks are identified by their Monday, never by the raw date a user picked.

pub mod planner;
pub mod week_key;
