//! Article use-case service.
//!
//! # Responsibility
//! - Accept wire requests, map them to `Article`, and return responses.
//! - Route each call to the direct or transactional repository entry point
//!   depending on whether the context carries a transaction.
//! - Open, commit and roll back transactions for multi-call units of work.
//!
//! # Invariants
//! - Identifier parsing happens before any repository call.
//! - Service APIs never bypass repository error mapping.

use crate::db::DbError;
use crate::model::article::{parse_article_id, Article, ArticleName, ArticleResponse};
use crate::repo::article_repo::ArticleRepository;
use crate::repo::context::RepoContext;
use crate::repo::error::RepoResult;
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Use-case service wrapper for article CRUD operations.
pub struct ArticleService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ArticleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Fetches one live article by id string.
    pub fn get_article(&self, ctx: &RepoContext<'_>, id: &str) -> RepoResult<ArticleResponse> {
        let id = parse_article_id(id)?;
        let article = if ctx.has_transaction() {
            self.repo.get_tx(ctx, id)?
        } else {
            self.repo.get(ctx, id)?
        };
        Ok(article.to_wire())
    }

    /// Creates an article with a caller-assigned id.
    ///
    /// # Contract
    /// - `id` must parse as a UUID; the request name is copied verbatim.
    /// - Returns the stored article in response form.
    pub fn create_article(
        &self,
        ctx: &RepoContext<'_>,
        id: &str,
        request: &impl ArticleName,
    ) -> RepoResult<ArticleResponse> {
        let article = Article::from_wire(id, request)?;
        if ctx.has_transaction() {
            self.repo.create_tx(ctx, &article)?;
        } else {
            self.repo.create(ctx, &article)?;
        }
        Ok(article.to_wire())
    }

    /// Renames a live article. The id itself is never updatable.
    pub fn update_article(
        &self,
        ctx: &RepoContext<'_>,
        id: &str,
        request: &impl ArticleName,
    ) -> RepoResult<ArticleResponse> {
        let article = Article::from_wire(id, request)?;
        if ctx.has_transaction() {
            self.repo.update_tx(ctx, &article)?;
        } else {
            self.repo.update(ctx, &article)?;
        }
        Ok(article.to_wire())
    }

    /// Soft-deletes an article. Deleting twice reports `NotFound`.
    pub fn delete_article(&self, ctx: &RepoContext<'_>, id: &str) -> RepoResult<()> {
        let id = parse_article_id(id)?;
        if ctx.has_transaction() {
            self.repo.delete_tx(ctx, id)
        } else {
            self.repo.delete(ctx, id)
        }
    }
}

/// Runs `work` inside one immediate transaction on `conn`.
///
/// `work` receives a context derived from `ctx` with the transaction
/// attached. The transaction commits when `work` returns `Ok` and rolls back
/// otherwise; the error from `work` is returned unchanged.
pub fn in_transaction<T>(
    conn: &Connection,
    ctx: &RepoContext<'_>,
    work: impl FnOnce(&RepoContext<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(DbError::from)?;

    let outcome = {
        let tx_ctx = ctx.with_transaction(&tx);
        work(&tx_ctx)
    };

    match outcome {
        Ok(value) => {
            tx.commit().map_err(DbError::from)?;
            debug!("event=tx_commit module=service status=ok");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=service status=error error={}",
                    rollback_err
                );
            } else {
                debug!("event=tx_rollback module=service status=ok cause={}", err);
            }
            Err(err)
        }
    }
}
