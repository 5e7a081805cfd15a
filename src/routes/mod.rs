// src/routes/mod.rs
//! HTTP surface of the service.

mod content;
mod health;
mod revalidate;
mod search;
mod webhook;

use crate::state::AppState;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Build the complete router.
///
/// # Route Structure
///
/// ## Revalidation
/// - `GET|HEAD /api/health` - Deep health probe / liveness
/// - `GET|POST /api/revalidate` - Manual revalidation (shared secret)
/// - `GET|POST /api/webhook/notion` - Notion change notifications
///
/// ## Content
/// - `GET /api/search` - Search with filters, sorting and pagination
/// - `GET /api/posts` - All published posts
/// - `GET /api/posts/{slug}` - One post with its body
/// - `GET /api/authors` - All authors
/// - `GET /api/categories` - Categories with post counts
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/health",
            get(health::health_check).head(health::liveness),
        )
        .route(
            "/revalidate",
            get(revalidate::revalidate_get).post(revalidate::revalidate_post),
        )
        .route(
            "/webhook/notion",
            get(webhook::liveness).post(webhook::receive),
        )
        .route("/search", get(search::search))
        .route("/posts", get(content::list_posts))
        .route("/posts/{slug}", get(content::get_post))
        .route("/authors", get(content::list_authors))
        .route("/categories", get(content::list_categories));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(log_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Log every request with its outcome and tag the response with an id.
async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    log::info!(
        "[{}] {} {} -> {} ({} ms)",
        request_id,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
