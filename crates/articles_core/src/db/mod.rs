//! Connection bootstrap for the articles store.
//!
//! Callers get a `Connection` from here and hand it to
//! `SqliteArticleRepository::try_new`; nothing in `repo` opens connections.
//!
//! # Invariants
//! - `open_*` returns only connections whose `PRAGMA user_version` equals
//!   `migrations::latest_version()`.
//! - `DbOptions` is applied before migrations run, so migrations see the
//!   configured busy timeout.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with, DbOptions};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or controlling a transaction on a
/// connection.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; it is left untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "articles database is at schema version {db_version}, this build supports up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
