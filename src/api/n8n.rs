// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::extract::ApiJson,
    auth::Auth,
    error::ApiError,
    providers::n8n::{N8nProxyRequest, ProxyCall},
    state::AppState,
};

/// Forward a request to the caller's N8N instance.
///
/// The upstream status, content type and body are relayed unchanged,
/// including upstream 4xx/5xx answers.
#[utoipa::path(
    post,
    path = "/api/n8n/proxy",
    tag = "N8N",
    security(("bearer_auth" = [])),
    request_body = N8nProxyRequest,
    responses(
        (status = 200, description = "Upstream response relayed verbatim"),
        (status = 400, description = "Missing or invalid proxy parameters"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "N8N unreachable"),
        (status = 504, description = "N8N timed out")
    )
)]
pub async fn proxy(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<N8nProxyRequest>,
) -> Result<Response, ApiError> {
    let call = ProxyCall::from_request(request)?;
    tracing::debug!(user_id = %user.user_id, method = %call.method, "n8n proxy call");

    let upstream = state.n8n.forward(&call).await?;

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = (status, Body::from(upstream.body)).into_response();
    if let Some(content_type) = upstream
        .content_type
        .and_then(|ct| ct.parse().ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
