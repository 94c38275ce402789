//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for articles.
//! - Isolate SQLite statement details from service orchestration.
//! - Share one context type and one error taxonomy across repositories.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `NotCreated`,
//!   `NoRowsAffected`) in addition to wrapped driver errors.
//! - Transactions are owned by callers; repositories only participate.

pub mod article_repo;
pub mod context;
pub mod error;
pub mod statements;
