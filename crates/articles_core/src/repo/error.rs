//! Repository error taxonomy.
//!
//! Every variant raised by an article operation carries the operation name
//! and the identifying key so callers can log it without extra context.

use crate::db::DbError;
use crate::model::article::InvalidIdentifier;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// Supplied id text is not a UUID. Raised before any I/O.
    InvalidIdentifier(InvalidIdentifier),
    /// Target row does not exist or is soft-deleted.
    NotFound {
        operation: &'static str,
        key: String,
    },
    /// Insert reported success but wrote nothing.
    NotCreated { key: String },
    /// Update matched no live row.
    NoRowsAffected {
        operation: &'static str,
        key: String,
    },
    /// A `*_tx` call was made on a context without an attached transaction.
    NoAmbientTransaction,
    /// A direct call was made while a transaction is open on the repository
    /// connection. Raised before any I/O.
    TransactionOpenOnConnection,
    /// Any other driver failure.
    Underlying {
        operation: &'static str,
        key: String,
        source: rusqlite::Error,
    },
    StatementPrepare {
        operation: &'static str,
        source: rusqlite::Error,
    },
    UnknownStatement(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
    Db(DbError),
}

impl RepoError {
    /// Returns true when the driver aborted the statement because the
    /// context deadline passed or its cancellation token fired.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Underlying { source, .. } => {
                source.sqlite_error_code() == Some(ErrorCode::OperationInterrupted)
            }
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(err) => write!(f, "{err}"),
            Self::NotFound { operation, key } => write!(
                f,
                "error executing {operation} - {key}: the record you are attempting to find or update is not found"
            ),
            Self::NotCreated { key } => write!(
                f,
                "error executing create-article - {key}: no new rows were created"
            ),
            Self::NoRowsAffected { operation, key } => {
                write!(f, "error executing {operation} - {key}: no rows affected")
            }
            Self::NoAmbientTransaction => write!(f, "no transaction in context"),
            Self::TransactionOpenOnConnection => write!(
                f,
                "direct call rejected: a transaction is open on the repository connection; use the *_tx variant"
            ),
            Self::Underlying {
                operation,
                key,
                source,
            } => write!(f, "error executing {operation} - {key}: {source}"),
            Self::StatementPrepare { operation, source } => {
                write!(f, "failed to prepare statement `{operation}`: {source}")
            }
            Self::UnknownStatement(operation) => {
                write!(f, "no prepared statement registered for `{operation}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}; open it with db::open_db"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted article data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentifier(err) => Some(err),
            Self::Underlying { source, .. } => Some(source),
            Self::StatementPrepare { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::NotCreated { .. }
            | Self::NoRowsAffected { .. }
            | Self::NoAmbientTransaction
            | Self::TransactionOpenOnConnection
            | Self::UnknownStatement(_)
            | Self::UninitializedConnection { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<InvalidIdentifier> for RepoError {
    fn from(value: InvalidIdentifier) -> Self {
        Self::InvalidIdentifier(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}
