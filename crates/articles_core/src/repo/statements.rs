//! Prepared statement registry.
//!
//! # Responsibility
//! - Hold one SQL statement per logical operation, keyed by operation name.
//! - Prepare every statement once at construction so malformed SQL or a
//!   missing table aborts startup instead of surfacing per call.
//!
//! # Invariants
//! - The registry is immutable after construction.
//! - Statements live in the connection's prepared statement cache; a
//!   transaction opened on the same connection reuses the compiled handle.

use crate::repo::error::{RepoError, RepoResult};
use log::{debug, error};
use rusqlite::{CachedStatement, Connection};
use std::collections::BTreeMap;

/// Operation name -> SQL text for a set of prepared statements.
#[derive(Debug, Clone)]
pub struct StatementRegistry {
    statements: BTreeMap<&'static str, &'static str>,
}

impl StatementRegistry {
    /// Prepares every `(operation, sql)` pair on `conn`.
    ///
    /// # Errors
    /// - `RepoError::StatementPrepare` for the first statement SQLite rejects.
    pub fn prepare(
        conn: &Connection,
        statements: &[(&'static str, &'static str)],
    ) -> RepoResult<Self> {
        let mut registry = BTreeMap::new();
        for &(operation, sql) in statements {
            if let Err(source) = conn.prepare_cached(sql) {
                error!(
                    "event=statement_prepare module=repo status=error operation={} error={}",
                    operation, source
                );
                return Err(RepoError::StatementPrepare { operation, source });
            }
            registry.insert(operation, sql);
        }

        debug!(
            "event=statement_prepare module=repo status=ok count={}",
            registry.len()
        );
        Ok(Self {
            statements: registry,
        })
    }

    /// Returns the compiled statement for `operation` bound to `conn`.
    ///
    /// Pass the repository connection for direct calls, or the ambient
    /// transaction for transactional ones.
    pub fn statement<'c>(
        &self,
        conn: &'c Connection,
        operation: &str,
    ) -> RepoResult<CachedStatement<'c>> {
        let (&operation, &sql) = self
            .statements
            .get_key_value(operation)
            .ok_or_else(|| RepoError::UnknownStatement(operation.to_string()))?;
        conn.prepare_cached(sql)
            .map_err(|source| RepoError::StatementPrepare { operation, source })
    }

    /// Registered operation names in sorted order.
    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.statements.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::StatementRegistry;
    use crate::repo::error::RepoError;
    use rusqlite::Connection;

    fn scratch_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT NOT NULL);")
            .unwrap();
        conn
    }

    #[test]
    fn prepare_registers_all_operations() {
        let conn = scratch_conn();
        let registry = StatementRegistry::prepare(
            &conn,
            &[
                ("insert-item", "INSERT INTO items (label) VALUES (?1);"),
                ("count-items", "SELECT count(*) FROM items;"),
            ],
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.operations().collect::<Vec<_>>(),
            vec!["count-items", "insert-item"]
        );

        registry
            .statement(&conn, "insert-item")
            .unwrap()
            .execute(["first"])
            .unwrap();
        let count: i64 = registry
            .statement(&conn, "count-items")
            .unwrap()
            .query_row([], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn prepare_fails_fast_on_malformed_sql() {
        let conn = scratch_conn();
        let err = StatementRegistry::prepare(
            &conn,
            &[
                ("count-items", "SELECT count(*) FROM items;"),
                ("broken", "SELEKT nothing;"),
            ],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            RepoError::StatementPrepare {
                operation: "broken",
                ..
            }
        ));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let conn = scratch_conn();
        let registry = StatementRegistry::prepare(&conn, &[]).unwrap();
        assert!(registry.is_empty());

        let err = registry.statement(&conn, "missing").err().unwrap();
        assert!(matches!(err, RepoError::UnknownStatement(name) if name == "missing"));
    }

    #[test]
    fn statement_binds_to_transaction_on_same_connection() {
        let conn = scratch_conn();
        let registry = StatementRegistry::prepare(
            &conn,
            &[("insert-item", "INSERT INTO items (label) VALUES (?1);")],
        )
        .unwrap();

        let tx = conn.unchecked_transaction().unwrap();
        registry
            .statement(&tx, "insert-item")
            .unwrap()
            .execute(["rolled back"])
            .unwrap();
        tx.rollback().unwrap();

        let count: i64 = conn
            .query_row("SELECT count(*) FROM items;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
