//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `articles_core` linkage and run one article lifecycle against an
//!   in-memory database.
//! - Keep output deterministic for quick local sanity checks.

use articles_core::db::open_db_in_memory;
use articles_core::{
    ArticleService, CreateArticleRequest, RepoContext, RepoError, SqliteArticleRepository,
    UpdateArticleRequest,
};
use std::process::ExitCode;

const SMOKE_ARTICLE_ID: &str = "72bc87f3-4a9f-4d05-93fe-844d3cd94c65";

fn main() -> ExitCode {
    println!("articles_core version={}", articles_core::core_version());
    match run_smoke() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn)?);
    let ctx = RepoContext::new();

    let created = service.create_article(
        &ctx,
        SMOKE_ARTICLE_ID,
        &CreateArticleRequest {
            name: "Foobar".to_string(),
        },
    )?;
    println!("created id={} name={}", created.id, created.name);

    service.update_article(
        &ctx,
        SMOKE_ARTICLE_ID,
        &UpdateArticleRequest {
            name: "Baz".to_string(),
        },
    )?;
    let fetched = service.get_article(&ctx, SMOKE_ARTICLE_ID)?;
    println!("updated id={} name={}", fetched.id, fetched.name);

    service.delete_article(&ctx, SMOKE_ARTICLE_ID)?;
    match service.get_article(&ctx, SMOKE_ARTICLE_ID) {
        Err(RepoError::NotFound { .. }) => {
            println!("deleted id={SMOKE_ARTICLE_ID}");
            Ok(())
        }
        Err(err) => Err(err.into()),
        Ok(article) => Err(format!("article {} still visible after delete", article.id).into()),
    }
}
