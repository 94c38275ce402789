//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/create/update/delete over the `articles` table.
//! - Run each operation either on the repository connection or inside a
//!   transaction attached to the caller's `RepoContext`.
//!
//! # Invariants
//! - Soft-deleted rows (`deleted_at IS NOT NULL`) are invisible to every
//!   operation here.
//! - Zero affected rows is a domain error, never a silent success.
//! - This repository never begins, commits or rolls back a transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::article::{Article, ArticleId};
use crate::repo::context::RepoContext;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::statements::StatementRegistry;
use log::{debug, warn};
use rusqlite::{params, CachedStatement, Connection, OptionalExtension};
use uuid::Uuid;

pub const CREATE_ARTICLE: &str = "create-article";
pub const GET_ARTICLE: &str = "get-article";
pub const UPDATE_ARTICLE: &str = "update-article";
pub const DELETE_ARTICLE: &str = "delete-article";

/// Statements backing the article operations.
pub const ARTICLE_STATEMENTS: &[(&str, &str)] = &[
    (
        CREATE_ARTICLE,
        "INSERT INTO articles (article_id, name)
         VALUES (?1, ?2);",
    ),
    (
        GET_ARTICLE,
        "SELECT
            article_id,
            name
         FROM articles
         WHERE article_id = ?1
           AND deleted_at IS NULL;",
    ),
    (
        UPDATE_ARTICLE,
        "UPDATE articles
         SET
            name = ?1,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE article_id = ?2
           AND deleted_at IS NULL;",
    ),
    (
        DELETE_ARTICLE,
        "UPDATE articles
         SET
            deleted_at = (strftime('%s', 'now') * 1000),
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE article_id = ?1
           AND deleted_at IS NULL;",
    ),
];

/// Repository interface for article CRUD.
///
/// Plain methods run on the repository's own connection, each call its own
/// implicit unit of work, and fail with `TransactionOpenOnConnection` while a
/// transaction is open on that connection. `*_tx` methods run inside the transaction attached
/// to `ctx` and fail with `NoAmbientTransaction` when there is none.
pub trait ArticleRepository {
    fn get(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<Article>;
    fn get_tx(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<Article>;
    fn create(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()>;
    fn create_tx(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()>;
    fn update(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()>;
    fn update_tx(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()>;
    fn delete(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<()>;
    fn delete_tx(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<()>;
}

/// Where a statement runs.
#[derive(Clone, Copy)]
enum Executor<'a> {
    Connection(&'a Connection),
    Transaction(&'a Connection),
}

impl<'a> Executor<'a> {
    fn connection(self) -> &'a Connection {
        match self {
            Self::Connection(conn) | Self::Transaction(conn) => conn,
        }
    }

    fn mode(self) -> &'static str {
        match self {
            Self::Connection(_) => "direct",
            Self::Transaction(_) => "tx",
        }
    }
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
    statements: StatementRegistry,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Constructs a repository from a migrated connection and prepares all
    /// article statements on it.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `StatementPrepare` when any statement fails to compile.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let statements = StatementRegistry::prepare(conn, ARTICLE_STATEMENTS)?;
        Ok(Self { conn, statements })
    }

    pub fn statements(&self) -> &StatementRegistry {
        &self.statements
    }

    fn executor<'a>(&'a self, ctx: &'a RepoContext<'_>, use_tx: bool) -> RepoResult<Executor<'a>> {
        if use_tx {
            let tx = ctx.transaction()?;
            Ok(Executor::Transaction(tx.connection()))
        } else if !self.conn.is_autocommit() {
            Err(RepoError::TransactionOpenOnConnection)
        } else {
            Ok(Executor::Connection(self.conn))
        }
    }

    /// Runs `operation` with its prepared statement bound to `executor`.
    /// Driver errors are wrapped as `Underlying` with `operation` and `key`.
    fn run<T>(
        &self,
        ctx: &RepoContext<'_>,
        executor: Executor<'_>,
        operation: &'static str,
        key: &str,
        exec: impl FnOnce(&mut CachedStatement<'_>) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        let underlying = |source| RepoError::Underlying {
            operation,
            key: key.to_string(),
            source,
        };

        ctx.ensure_active().map_err(underlying)?;
        let conn = executor.connection();
        let mut stmt = self.statements.statement(conn, operation)?;
        let _interrupt = ctx.interrupt_guard(conn);
        exec(&mut stmt).map_err(underlying)
    }

    fn get_in(&self, ctx: &RepoContext<'_>, use_tx: bool, id: ArticleId) -> RepoResult<Article> {
        let key = id.to_string();
        let executor = self.executor(ctx, use_tx)?;

        let row = self.run(ctx, executor, GET_ARTICLE, &key, |stmt| {
            stmt.query_row([key.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .optional()
        });

        let result = row.and_then(|row| match row {
            Some((id_text, name)) => Ok(Article::new(parse_stored_id(&id_text)?, name)),
            None => Err(RepoError::NotFound {
                operation: GET_ARTICLE,
                key: key.clone(),
            }),
        });
        log_outcome("article_get", executor, &key, &result);
        result
    }

    fn create_in(&self, ctx: &RepoContext<'_>, use_tx: bool, article: &Article) -> RepoResult<()> {
        let key = article.id.to_string();
        let executor = self.executor(ctx, use_tx)?;

        let result = self
            .run(ctx, executor, CREATE_ARTICLE, &key, |stmt| {
                stmt.execute(params![key.as_str(), article.name.as_str()])
            })
            .and_then(|changed| {
                if changed == 0 {
                    return Err(RepoError::NotCreated { key: key.clone() });
                }
                Ok(())
            });
        log_outcome("article_create", executor, &key, &result);
        result
    }

    fn update_in(&self, ctx: &RepoContext<'_>, use_tx: bool, article: &Article) -> RepoResult<()> {
        let key = article.id.to_string();
        let executor = self.executor(ctx, use_tx)?;

        let result = self
            .run(ctx, executor, UPDATE_ARTICLE, &key, |stmt| {
                stmt.execute(params![article.name.as_str(), key.as_str()])
            })
            .and_then(|changed| {
                if changed == 0 {
                    return Err(RepoError::NoRowsAffected {
                        operation: UPDATE_ARTICLE,
                        key: key.clone(),
                    });
                }
                Ok(())
            });
        log_outcome("article_update", executor, &key, &result);
        result
    }

    fn delete_in(&self, ctx: &RepoContext<'_>, use_tx: bool, id: ArticleId) -> RepoResult<()> {
        let key = id.to_string();
        let executor = self.executor(ctx, use_tx)?;

        let result = self
            .run(ctx, executor, DELETE_ARTICLE, &key, |stmt| {
                stmt.execute([key.as_str()])
            })
            .and_then(|changed| {
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        operation: DELETE_ARTICLE,
                        key: key.clone(),
                    });
                }
                Ok(())
            });
        log_outcome("article_delete", executor, &key, &result);
        result
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn get(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<Article> {
        self.get_in(ctx, false, id)
    }

    fn get_tx(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<Article> {
        self.get_in(ctx, true, id)
    }

    fn create(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()> {
        self.create_in(ctx, false, article)
    }

    fn create_tx(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()> {
        self.create_in(ctx, true, article)
    }

    fn update(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()> {
        self.update_in(ctx, false, article)
    }

    fn update_tx(&self, ctx: &RepoContext<'_>, article: &Article) -> RepoResult<()> {
        self.update_in(ctx, true, article)
    }

    fn delete(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<()> {
        self.delete_in(ctx, false, id)
    }

    fn delete_tx(&self, ctx: &RepoContext<'_>, id: ArticleId) -> RepoResult<()> {
        self.delete_in(ctx, true, id)
    }
}

fn parse_stored_id(value: &str) -> RepoResult<ArticleId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{value}` in articles.article_id"
        ))
    })
}

fn log_outcome<T>(event: &str, executor: Executor<'_>, key: &str, result: &RepoResult<T>) {
    match result {
        Ok(_) => debug!(
            "event={} module=repo status=ok mode={} article_id={}",
            event,
            executor.mode(),
            key
        ),
        Err(err) => warn!(
            "event={} module=repo status=error mode={} article_id={} error={}",
            event,
            executor.mode(),
            key,
            err
        ),
    }
}
