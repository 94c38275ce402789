//! Article entity and wire mapping.
//!
//! # Responsibility
//! - Define the canonical `{ id, name }` record persisted in `articles`.
//! - Parse and validate caller-supplied identifiers.
//! - Map any request exposing a name into an entity, and an entity into the
//!   response shape.
//!
//! # Invariants
//! - Identifier parsing happens before any other field is read.
//! - `to_wire` renders the canonical hyphenated UUID form and never fails.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable, caller-assigned article identifier.
pub type ArticleId = Uuid;

/// A row of the `articles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
}

/// Identifier text that does not parse as a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier {
    value: String,
    reason: String,
}

impl InvalidIdentifier {
    /// The rejected input, verbatim.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for InvalidIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid article identifier `{}`: {}",
            self.value, self.reason
        )
    }
}

impl Error for InvalidIdentifier {}

/// Wire requests that carry an article name.
///
/// Any request type implementing this can be mapped into an [`Article`],
/// so the mapper is not tied to one message schema.
pub trait ArticleName {
    fn name(&self) -> &str;
}

/// Incoming create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub name: String,
}

/// Incoming update request. The id travels separately (path/key), never in
/// the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateArticleRequest {
    pub name: String,
}

impl ArticleName for CreateArticleRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ArticleName for UpdateArticleRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Outgoing article response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: String,
    pub name: String,
}

/// Parses a caller-supplied identifier.
///
/// Accepts every textual form `uuid` understands (hyphenated, simple,
/// braced, urn); the stored form is always the canonical hyphenated one.
pub fn parse_article_id(value: &str) -> Result<ArticleId, InvalidIdentifier> {
    Uuid::parse_str(value).map_err(|err| InvalidIdentifier {
        value: value.to_string(),
        reason: err.to_string(),
    })
}

impl Article {
    pub fn new(id: ArticleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Builds an article from an id string and a wire request.
    ///
    /// # Errors
    /// - Returns [`InvalidIdentifier`] when `id` is malformed; `wire` is not
    ///   consulted in that case.
    pub fn from_wire(id: &str, wire: &impl ArticleName) -> Result<Self, InvalidIdentifier> {
        let id = parse_article_id(id)?;
        Ok(Self::new(id, wire.name()))
    }

    /// Renders this article as a response.
    pub fn to_wire(&self) -> ArticleResponse {
        ArticleResponse {
            id: self.id.to_string(),
            name: self.name.clone(),
        }
    }
}

impl From<&Article> for ArticleResponse {
    fn from(value: &Article) -> Self {
        value.to_wire()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_article_id, Article, ArticleName};
    use std::cell::Cell;

    struct CountingRequest {
        calls: Cell<u32>,
    }

    impl ArticleName for CountingRequest {
        fn name(&self) -> &str {
            self.calls.set(self.calls.get() + 1);
            "counted"
        }
    }

    #[test]
    fn from_wire_does_not_read_name_for_bad_id() {
        let request = CountingRequest {
            calls: Cell::new(0),
        };

        let err = Article::from_wire("not-a-uuid", &request).unwrap_err();
        assert_eq!(err.value(), "not-a-uuid");
        assert_eq!(request.calls.get(), 0);

        let article =
            Article::from_wire("72bc87f3-4a9f-4d05-93fe-844d3cd94c65", &request).unwrap();
        assert_eq!(article.name, "counted");
        assert_eq!(request.calls.get(), 1);
    }

    #[test]
    fn parse_accepts_uppercase_and_renders_canonical() {
        let id = parse_article_id("72BC87F3-4A9F-4D05-93FE-844D3CD94C65").unwrap();
        assert_eq!(id.to_string(), "72bc87f3-4a9f-4d05-93fe-844d3cd94c65");
    }

    #[test]
    fn parse_rejects_empty_string() {
        let err = parse_article_id("").unwrap_err();
        assert!(err.to_string().contains("invalid article identifier"));
    }
}
