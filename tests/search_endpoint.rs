// tests/search_endpoint.rs
//! `GET /api/search`.

mod common;

use common::{post_page, Failure, FakeSource, TestApp};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn titles(body: &Value) -> Vec<String> {
    body["posts"]
        .as_array()
        .map(|posts| {
            posts
                .iter()
                .filter_map(|p| p["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn blank_query_returns_only_filter_metadata() {
    let app = TestApp::new(FakeSource::populated());

    for uri in [
        "/api/search",
        "/api/search?q=",
        "/api/search?q=%20%20&category=Direito",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, 200, "{}", uri);
        assert_eq!(body["posts"], serde_json::json!([]));
        assert_eq!(body["total"], 0);
        assert_eq!(body["pagination"]["totalPages"], 0);
        assert_eq!(body["filters"]["categories"][0]["name"], "Direito");
    }

    assert!(!app
        .source
        .calls()
        .iter()
        .any(|call| call.starts_with("search_pages")));
}

#[tokio::test]
async fn blank_query_survives_a_failing_category_lookup() {
    let app = TestApp::new(FakeSource::new().failing(Failure::Unreachable));

    let (status, body) = app.get("/api/search?q=").await;

    assert_eq!(status, 200);
    assert_eq!(body["total"], 0);
    assert_eq!(body["filters"]["categories"], serde_json::json!([]));
}

#[tokio::test]
async fn query_filters_sorts_and_suggests() {
    let app = TestApp::new(FakeSource::populated());

    let (status, body) = app.get("/api/search?q=licit&sort=date").await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);
    assert_eq!(
        titles(&body),
        vec!["Gestão de contratos", "Licitação sem mistério"]
    );
    assert_eq!(body["suggestions"][0], "licitação");
    assert_eq!(body["posts"][0]["author"]["name"], "Marina Costa");

    let (_, body) = app.get("/api/search?q=licit&category=direito").await;
    assert_eq!(titles(&body), vec!["Licitação sem mistério"]);

    let (_, body) = app.get("/api/search?q=licit&author=marina").await;
    assert_eq!(body["total"], 2);

    let (_, body) = app.get("/api/search?q=licit&author=someone-else").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn results_outside_the_posts_database_are_dropped() {
    let stray = serde_json::from_value(serde_json::json!({
        "id": "dddddddddddddddddddddddddddddddd",
        "parent": {"type": "page_id", "page_id": "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"},
        "properties": {"title": {"type": "title", "title": [{"plain_text": "Rascunho"}]}}
    }))
    .unwrap();
    let posts = vec![post_page(
        "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb1",
        "Licitação sem mistério",
        "licitacao",
        "Direito",
        "2024-03-01",
    )];
    let source = FakeSource::populated().with_search_results(vec![posts[0].clone(), stray]);
    let app = TestApp::new(source);

    let (_, body) = app.get("/api/search?q=a").await;

    assert_eq!(titles(&body), vec!["Licitação sem mistério"]);
}

#[tokio::test]
async fn pagination_is_bounded() {
    let app = TestApp::new(FakeSource::populated());

    let (_, body) = app.get("/api/search?q=a&limit=1&page=2").await;
    assert_eq!(body["total"], 2);
    assert_eq!(titles(&body), vec!["Gestão de contratos"]);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasPrev"], true);
    assert_eq!(body["pagination"]["hasNext"], false);

    let (_, body) = app.get("/api/search?q=a&limit=1000&page=zero").await;
    assert_eq!(body["pagination"]["limit"], 50);
    assert_eq!(body["pagination"]["page"], 1);
}

#[tokio::test]
async fn source_failure_degrades_to_an_empty_500() {
    let app = TestApp::new(FakeSource::populated().failing(Failure::Unreachable));

    let (status, body) = app.get("/api/search?q=licit").await;

    assert_eq!(status, 500);
    assert_eq!(body["posts"], serde_json::json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["pagination"]["totalPages"], 0);
    assert!(body["error"].is_string());
}
