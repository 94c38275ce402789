//! Request-scoped context carried through repository calls.
//!
//! # Responsibility
//! - Carry an optional caller-owned transaction to `*_tx` operations.
//! - Carry an optional deadline and cancellation token that abort
//!   in-flight statements.
//!
//! # Invariants
//! - Attaching a transaction never begins, commits or rolls it back.
//! - Retrieval without an attachment fails with `NoAmbientTransaction`.
//! - The same context type is shared by every repository in this crate.

use crate::repo::error::{RepoError, RepoResult};
use rusqlite::{ffi, Connection, Transaction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// SQLite VM instructions between deadline/cancellation checks.
const INTERRUPT_CHECK_INTERVAL_OPS: i32 = 1_000;

/// Shared flag that aborts statements running under any context holding a
/// clone of it. `cancel` may be called from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A transaction attached to a [`RepoContext`].
///
/// Only constructible from a `rusqlite::Transaction`, so holding one proves
/// the caller opened a transaction on the connection.
#[derive(Debug, Clone, Copy)]
pub struct AmbientTransaction<'tx> {
    conn: &'tx Connection,
}

impl<'tx> AmbientTransaction<'tx> {
    pub fn connection(self) -> &'tx Connection {
        self.conn
    }
}

/// Per-call context: ambient transaction plus cancellation signals.
#[derive(Debug, Clone, Default)]
pub struct RepoContext<'tx> {
    transaction: Option<AmbientTransaction<'tx>>,
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl<'tx> RepoContext<'tx> {
    /// Empty context: no transaction, no deadline, not cancellable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a derived context carrying `tx`. Deadline and cancellation
    /// token are inherited; `self` is left untouched.
    pub fn with_transaction<'a>(&self, tx: &'a Transaction<'_>) -> RepoContext<'a> {
        let conn: &'a Connection = tx;
        RepoContext {
            transaction: Some(AmbientTransaction { conn }),
            deadline: self.deadline,
            cancellation: self.cancellation.clone(),
        }
    }

    /// Retrieves the attached transaction.
    ///
    /// # Errors
    /// - `RepoError::NoAmbientTransaction` when none was attached.
    pub fn transaction(&self) -> RepoResult<AmbientTransaction<'tx>> {
        self.transaction.ok_or(RepoError::NoAmbientTransaction)
    }

    pub fn has_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails with a driver-shaped interrupt error when the context is already
    /// expired or cancelled, so no statement is started.
    pub(crate) fn ensure_active(&self) -> rusqlite::Result<()> {
        if let Some(reason) = interrupt_reason(self.deadline, self.cancellation.as_ref()) {
            return Err(rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_INTERRUPT),
                Some(reason.to_string()),
            ));
        }
        Ok(())
    }

    /// Installs a progress handler on `conn` that interrupts the running
    /// statement once this context expires or is cancelled. The handler is
    /// removed when the guard drops.
    pub(crate) fn interrupt_guard<'c>(&self, conn: &'c Connection) -> InterruptGuard<'c> {
        if self.deadline.is_none() && self.cancellation.is_none() {
            return InterruptGuard { conn: None };
        }

        let deadline = self.deadline;
        let cancellation = self.cancellation.clone();
        conn.progress_handler(
            INTERRUPT_CHECK_INTERVAL_OPS,
            Some(move || interrupt_reason(deadline, cancellation.as_ref()).is_some()),
        );
        InterruptGuard { conn: Some(conn) }
    }
}

fn interrupt_reason(
    deadline: Option<Instant>,
    cancellation: Option<&CancellationToken>,
) -> Option<&'static str> {
    if cancellation.is_some_and(CancellationToken::is_cancelled) {
        return Some("context cancelled");
    }
    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        return Some("context deadline exceeded");
    }
    None
}

pub(crate) struct InterruptGuard<'c> {
    conn: Option<&'c Connection>,
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn {
            conn.progress_handler(0, None::<fn() -> bool>);
        }
    }
}
