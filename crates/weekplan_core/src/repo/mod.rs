//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Isolate SQLite details from the week store.

pub mod state_repo;
