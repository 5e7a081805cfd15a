// src/routes/search.rs

use crate::search::{self, SearchParams, SearchRequest, SearchResponse};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

/// `GET /api/search`
///
/// A blank query answers with the category list only and never reaches the
/// content source. Failures degrade to an empty 500 result.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<SearchResponse>) {
    let request = SearchRequest::from_params(&params);

    if request.is_blank() {
        let categories = state.queries.get_all_categories().await.unwrap_or_else(|e| {
            log::warn!("Search filters without categories: {}", e);
            Vec::new()
        });
        return (StatusCode::OK, Json(SearchResponse::blank(&request, &categories)));
    }

    match state.queries.search_posts(&request.query).await {
        Ok(results) => {
            log::debug!("Search '{}' matched {} posts", request.query, results.len());
            (StatusCode::OK, Json(search::run(&request, results)))
        }
        Err(e) => {
            log::error!("Search '{}' failed: {}", request.query, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse::failed(&request, "Search failed")),
            )
        }
    }
}
