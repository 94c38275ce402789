use articles_core::{
    parse_article_id, Article, ArticleName, ArticleResponse, CreateArticleRequest,
    UpdateArticleRequest,
};
use uuid::Uuid;

const ARTICLE_ID: &str = "72bc87f3-4a9f-4d05-93fe-844d3cd94c65";

#[test]
fn from_wire_copies_id_and_name() {
    let request = CreateArticleRequest {
        name: "Foobar".to_string(),
    };

    let article = Article::from_wire(ARTICLE_ID, &request).unwrap();
    assert_eq!(article.id, Uuid::parse_str(ARTICLE_ID).unwrap());
    assert_eq!(article.name, "Foobar");
}

#[test]
fn from_wire_accepts_any_named_request() {
    struct LegacyRequest {
        title: String,
    }

    impl ArticleName for LegacyRequest {
        fn name(&self) -> &str {
            &self.title
        }
    }

    let legacy = LegacyRequest {
        title: "legacy".to_string(),
    };
    let update = UpdateArticleRequest {
        name: "update".to_string(),
    };

    assert_eq!(Article::from_wire(ARTICLE_ID, &legacy).unwrap().name, "legacy");
    assert_eq!(Article::from_wire(ARTICLE_ID, &update).unwrap().name, "update");
}

#[test]
fn from_wire_rejects_malformed_ids() {
    let request = CreateArticleRequest::default();

    for bad in ["", "72bc87f3", "72bc87f3-4a9f-4d05-93fe-844d3cd94c6z", "not a uuid"] {
        let err = Article::from_wire(bad, &request).unwrap_err();
        assert_eq!(err.value(), bad);
    }
    assert!(parse_article_id("72bc87f3-4a9f-4d05-93fe-844d3cd94c65-extra").is_err());
}

#[test]
fn to_wire_renders_canonical_id() {
    let article = Article::new(parse_article_id(ARTICLE_ID).unwrap(), "foobar");

    let response = article.to_wire();
    assert_eq!(response.id, ARTICLE_ID);
    assert_eq!(response.name, "foobar");
    assert_eq!(ArticleResponse::from(&article), response);
}

#[test]
fn wire_shapes_use_expected_json_fields() {
    let response = Article::new(parse_article_id(ARTICLE_ID).unwrap(), "foobar").to_wire();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({ "id": ARTICLE_ID, "name": "foobar" }));

    let request: CreateArticleRequest =
        serde_json::from_value(serde_json::json!({ "name": "from json" })).unwrap();
    assert_eq!(request.name(), "from json");
}
