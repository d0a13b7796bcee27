//! Blob storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Read and overwrite whole serialized blobs under fixed storage keys.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - A write replaces the previous value for its key entirely.
//! - Reads of a never-written key return `Ok(None)`, not an error.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the planner state blob.
pub const PLANNER_STATE_KEY: &str = "planer";
/// Storage key of the "onboarding instructions seen" flag.
pub const INSTRUCTIONS_SEEN_KEY: &str = "planer_instructions_seen";
/// Storage key holding the last planner blob that failed to decode.
pub const UNREADABLE_STATE_KEY: &str = "planer_unreadable";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for blob reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value blob storage used by the week store.
pub trait StateRepository {
    fn read_blob(&self, key: &str) -> RepoResult<Option<String>>;
    fn write_blob(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed blob repository over the `kv_store` table.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn read_blob(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_blob(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}
