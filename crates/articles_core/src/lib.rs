//! Core persistence layer for articles.
//! Transactional CRUD over a soft-deleted `articles` table, usable standalone
//! or inside a caller-owned transaction.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{init_logging, logging_status, LoggingError};
pub use model::article::{
    parse_article_id, Article, ArticleId, ArticleName, ArticleResponse, CreateArticleRequest,
    InvalidIdentifier, UpdateArticleRequest,
};
pub use repo::article_repo::{ArticleRepository, SqliteArticleRepository, ARTICLE_STATEMENTS};
pub use repo::context::{AmbientTransaction, CancellationToken, RepoContext};
pub use repo::error::{RepoError, RepoResult};
pub use repo::statements::StatementRegistry;
pub use service::article_service::{in_transaction, ArticleService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
