use articles_core::db::migrations::{current_user_version, latest_version};
use articles_core::db::{open_db, open_db_in_memory, open_db_with, DbError, DbOptions};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_table_has_columns(
        &conn,
        "articles",
        &["article_id", "name", "created_at", "updated_at", "deleted_at"],
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO articles (article_id, name) VALUES (?1, ?2);",
            ["72bc87f3-4a9f-4d05-93fe-844d3cd94c65", "kept"],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT count(*) FROM articles;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("schema version 999"));
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_db_with_applies_options() {
    let dir = tempfile::tempdir().unwrap();
    let options = DbOptions {
        busy_timeout: Duration::from_millis(250),
        statement_cache_capacity: 8,
    };

    let conn = open_db_with(dir.path().join("tuned.db"), &options).unwrap();
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
    assert_eq!(busy_timeout, 250);
}

fn assert_table_has_columns(conn: &Connection, table: &str, expected: &[&str]) {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    for column in expected {
        assert!(
            columns.iter().any(|current| current == column),
            "column {table}.{column} does not exist"
        );
    }
}
