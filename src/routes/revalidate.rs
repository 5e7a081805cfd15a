// src/routes/revalidate.rs

use crate::error::ApiError;
use crate::revalidation::manual::{RevalidateRequest, RevalidationTarget};
use crate::revalidation::{execute, Invalidation};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Query form of a manual revalidation; `tags` is comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    secret: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    slug: Option<String>,
    tags: Option<String>,
}

impl From<RevalidateQuery> for RevalidateRequest {
    fn from(query: RevalidateQuery) -> Self {
        Self {
            secret: query.secret,
            kind: query.kind,
            slug: query.slug,
            tags: query
                .tags
                .map(|tags| tags.split(',').map(str::to_string).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    revalidated: bool,
    #[serde(rename = "type")]
    kind: String,
    invalidated: Vec<Invalidation>,
    /// Milliseconds since the Unix epoch.
    now: i64,
}

/// `GET /api/revalidate?secret=..&type=..`
pub async fn revalidate_get(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
) -> Result<Json<RevalidateResponse>, ApiError> {
    revalidate(&state, query.into()).await
}

/// `POST /api/revalidate`
///
/// The secret may also be passed as a query parameter.
pub async fn revalidate_post(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
    body: Bytes,
) -> Result<Json<RevalidateResponse>, ApiError> {
    let mut request: RevalidateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RevalidateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };
    if request.secret.is_none() {
        request.secret = query.secret;
    }
    revalidate(&state, request).await
}

async fn revalidate(
    state: &AppState,
    request: RevalidateRequest,
) -> Result<Json<RevalidateResponse>, ApiError> {
    if !state.config.revalidation_secret.matches(request.secret.as_deref()) {
        log::warn!("Rejected revalidation request with an invalid secret");
        return Err(ApiError::Unauthorized("Invalid secret".to_string()));
    }

    let target = RevalidationTarget::from_request(&request)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let plan = target.plan();

    execute(state.revalidator.as_ref(), &plan)
        .await
        .map_err(ApiError::Internal)?;
    log::info!("Manual revalidation '{}' done", target.label());

    Ok(Json(RevalidateResponse {
        revalidated: true,
        kind: target.label().to_string(),
        invalidated: plan,
        now: chrono::Utc::now().timestamp_millis(),
    }))
}
