// src/routes/webhook.rs

use crate::error::ApiError;
use crate::revalidation::{execute, Invalidation};
use crate::state::AppState;
use crate::webhook::{self, Dispatch, WebhookPayload};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

const SIGNATURE_HEADER: &str = "notion-signature";

#[derive(Debug, Default, Serialize)]
pub struct WebhookResponse {
    received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invalidated: Option<Vec<Invalidation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
}

impl WebhookResponse {
    fn received() -> Self {
        Self {
            received: true,
            ..Default::default()
        }
    }
}

/// `POST /api/webhook/notion`
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signed = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty());
    if !signed {
        return Err(ApiError::BadRequest(
            "Missing notion-signature header".to_string(),
        ));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest("Empty webhook body".to_string()));
    }

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    // Subscription handshake: Notion posts a one-off token to confirm the URL.
    if let Some(token) = value.get("verification_token").and_then(Value::as_str) {
        log::info!("Webhook verification token received: {}", token);
        return Ok(Json(WebhookResponse {
            verification: Some(true),
            ..WebhookResponse::received()
        }));
    }

    let payload: WebhookPayload = serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    match webhook::plan(&payload, &state.config.databases) {
        Dispatch::Ignored => {
            log::debug!("Ignoring non-page webhook event");
            Ok(Json(WebhookResponse {
                ignored: Some(true),
                ..WebhookResponse::received()
            }))
        }
        Dispatch::UnknownDatabase => {
            log::info!(
                "Webhook for page {} outside the configured databases",
                payload.object.id
            );
            Ok(Json(WebhookResponse {
                database: Some("unknown"),
                ..WebhookResponse::received()
            }))
        }
        Dispatch::Planned(plan) => {
            log::info!(
                "Webhook {} on {} page {}",
                plan.action,
                plan.database.as_str(),
                payload.object.id
            );
            execute(state.revalidator.as_ref(), &plan.invalidations)
                .await
                .map_err(ApiError::Internal)?;

            Ok(Json(WebhookResponse {
                database: Some(plan.database.as_str()),
                action: Some(plan.action.as_str()),
                invalidated: Some(plan.invalidations),
                warnings: Some(plan.warnings),
                ..WebhookResponse::received()
            }))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Liveness {
    status: &'static str,
    endpoint: &'static str,
    timestamp: DateTime<Utc>,
}

/// `GET /api/webhook/notion`
pub async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        endpoint: "/api/webhook/notion",
        timestamp: Utc::now(),
    })
}
