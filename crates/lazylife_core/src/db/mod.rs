//! Local SQLite file that stands in for the remote document service.
//!
//! # Responsibility
//! - Hand out connections whose `documents` and `objects` tables are ready
//!   for `SqliteDocumentStore` and `SqliteObjectStore`.
//! - Surface open and schema failures as `DbError` so stores never see a
//!   half-initialized file.
//!
//! # Invariants
//! - Every connection returned by `open_db`/`open_db_in_memory` is at
//!   `migrations::latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

/// Connection bootstrap and schema errors.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The database file's parent directory does not exist.
    MissingParentDir(PathBuf),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A schema step's SQL failed; nothing from the batch was committed.
    SchemaStep {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::MissingParentDir(path) => {
                write!(f, "database directory does not exist: {}", path.display())
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaStep { version, name, .. } => {
                write!(f, "schema step {version} ({name}) failed")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::SchemaStep { source: err, .. } => Some(err),
            Self::MissingParentDir(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
