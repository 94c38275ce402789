//! Article domain model and wire shapes.
//!
//! # Responsibility
//! - Define the persisted `Article` entity.
//! - Convert between wire requests/responses and the entity.
//!
//! # Invariants
//! - Every article is identified by a caller-assigned `ArticleId`.
//! - Deletion is represented by a `deleted_at` tombstone in storage, not
//!   by a field on the entity.

pub mod article;
