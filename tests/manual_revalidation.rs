// tests/manual_revalidation.rs
//! `GET|POST /api/revalidate`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{FakeSource, RecordingRevalidator, TestApp};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn default_secret_revalidates_posts() {
    let app = TestApp::new(FakeSource::new());

    let (status, body) = app
        .post_json("/api/revalidate", json!({"secret": "dev-secret", "type": "posts"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revalidated"], true);
    assert_eq!(body["type"], "posts");
    assert!(body["now"].as_i64().is_some());
    assert_eq!(app.revalidator.rendered(), vec!["tag:posts", "path:/"]);
}

#[tokio::test]
async fn wrong_secret_is_unauthorized_and_invalidates_nothing() {
    let app = TestApp::new(FakeSource::new());

    for body in [
        json!({"secret": "nope", "type": "all"}),
        json!({"type": "all"}),
        json!({"secret": "", "type": "posts"}),
    ] {
        let (status, response) = app.post_json("/api/revalidate", body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response, json!({"status": "error", "error": "Invalid secret"}));
    }

    let (status, _) = app.get("/api/revalidate?secret=nope&type=all").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.revalidator.calls().is_empty());
}

#[tokio::test]
async fn configured_secret_replaces_the_default() {
    let app = TestApp::build(
        FakeSource::new(),
        RecordingRevalidator::default(),
        &[("REVALIDATION_SECRET", "s3cr3t")],
    );

    let (status, _) = app
        .post_json("/api/revalidate", json!({"secret": "dev-secret", "type": "posts"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post_json("/api/revalidate", json!({"secret": "s3cr3t", "type": "posts"}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn all_invalidates_every_tag_and_the_root() {
    let app = TestApp::new(FakeSource::new());

    let (status, body) = app
        .post_json("/api/revalidate", json!({"secret": "dev-secret", "type": "all"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invalidated"].as_array().map(Vec::len), Some(5));
    assert_eq!(
        app.revalidator.rendered(),
        vec!["tag:posts", "tag:post", "tag:authors", "tag:categories", "path:/"]
    );
}

#[tokio::test]
async fn get_form_supports_slugs_and_tag_lists() {
    let app = TestApp::new(FakeSource::new());

    let (status, body) = app
        .get("/api/revalidate?secret=dev-secret&type=post&slug=nova-lei")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "post");

    let (status, body) = app
        .get("/api/revalidate?secret=dev-secret&type=newsletter&tags=home,newsletter")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "newsletter");

    assert_eq!(
        app.revalidator.rendered(),
        vec![
            "tag:post",
            "tag:posts",
            "path:/post/nova-lei",
            "tag:home",
            "tag:newsletter"
        ]
    );
}

#[tokio::test]
async fn unknown_type_without_tags_is_a_bad_request() {
    let app = TestApp::new(FakeSource::new());

    let (status, body) = app
        .post_json("/api/revalidate", json!({"secret": "dev-secret", "type": "everything"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(app.revalidator.calls().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new(FakeSource::new());

    let request = Request::post("/api/revalidate")
        .header("content-type", "application/json")
        .body(Body::from("{\"secret\": "))
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.revalidator.calls().is_empty());
}

#[tokio::test]
async fn secret_may_come_from_the_query_string() {
    let app = TestApp::new(FakeSource::new());

    let (status, _) = app
        .post_json("/api/revalidate?secret=dev-secret", json!({"type": "category", "slug": "direito"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.revalidator.rendered(),
        vec!["tag:categories", "path:/category/direito"]
    );
}

#[tokio::test]
async fn revalidator_failure_is_a_server_error() {
    let app = TestApp::build(FakeSource::new(), RecordingRevalidator::failing(), &[]);

    let (status, body) = app
        .post_json("/api/revalidate", json!({"secret": "dev-secret", "type": "posts"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
}
