// src/routes/health.rs

use crate::health::{self, HealthStatus, SiteInfo};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ProbeFailure {
    status: HealthStatus,
    error: String,
    timestamp: DateTime<Utc>,
}

/// `GET /api/health`
///
/// 200 when healthy, 503 with the partial report when degraded. The probe
/// runs in its own task so that a panic inside it still yields a 500.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let probe = tokio::spawn(async move {
        health::probe(
            state.source.as_ref(),
            &state.config.databases,
            &state.cache,
            SiteInfo::from_config(&state.config),
        )
        .await
    });

    match probe.await {
        Ok(report) => {
            let status = if report.is_healthy() {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (status, Json(report)).into_response()
        }
        Err(e) => {
            log::error!("Health probe failed: {}", e);
            let body = ProbeFailure {
                status: HealthStatus::Error,
                error: "Health check failed".to_string(),
                timestamp: Utc::now(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// `HEAD /api/health`
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
