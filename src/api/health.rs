// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, response::Html, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const BANNER: &str = "<!doctype html>\
<html><head><title>Filper API</title></head>\
<body><h1>Filper API is online</h1>\
<p>See <a href=\"/docs\">/docs</a> for the API reference.</p></body></html>";

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// "ok" or "degraded"
    pub status: String,
    /// Seconds since the server started
    pub uptime: f64,
    /// Whether the database answered a read transaction
    pub db_connected: bool,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveResponse {
    pub status: String,
}

/// Landing page.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "API banner", body = String, content_type = "text/html"))
)]
pub async fn root() -> Html<&'static str> {
    Html(BANNER)
}

/// Health check endpoint handler.
///
/// Returns 200 when the database is reachable, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Database unavailable", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let db_connected = state.store.is_healthy();
    let status = if db_connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthStatus {
        status: if db_connected { "ok" } else { "degraded" }.to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        db_connected,
    };

    (status, Json(body))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = LiveResponse)
    )
)]
pub async fn liveness() -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "ok".to_string(),
    })
}
