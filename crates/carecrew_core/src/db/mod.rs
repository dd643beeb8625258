//! SQLite bootstrap for the durable key-value slots.
//!
//! # Responsibility
//! - Open the store file (or an in-memory store) and bring its schema current.
//! - Classify failures by the step that produced them.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No slot is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The connection could not be established or configured.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// A migration step failed; the whole upgrade was rolled back.
    Migration { version: u32, source: rusqlite::Error },
    /// The store file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// A slot read or write failed on an open connection.
    Query(rusqlite::Error),
}

impl DbError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "store_open_failed",
            Self::Migration { .. } => "store_migration_failed",
            Self::SchemaTooNew { .. } => "store_schema_too_new",
            Self::Query(_) => "store_query_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "cannot open {mode} store: {source}"),
            Self::Migration { version, source } => {
                write!(f, "store migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "store schema version {found} is newer than supported {supported}"
            ),
            Self::Query(source) => write!(f, "store query failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } | Self::Query(source) => {
                Some(source)
            }
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
