// src/routes/content.rs
//! Read-only content endpoints backed by the cached queries.

use crate::content::{Author, Category, Post};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;

/// `GET /api/posts`
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.queries.get_all_posts().await?))
}

/// `GET /api/posts/{slug}`
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    state
        .queries
        .get_post_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug '{}'", slug)))
}

/// `GET /api/authors`
pub async fn list_authors(State(state): State<AppState>) -> Result<Json<Vec<Author>>, ApiError> {
    Ok(Json(state.queries.get_all_authors().await?))
}

/// `GET /api/categories`
///
/// Categories with their post counts.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.queries.get_category_stats().await?))
}
