// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! N8N public REST API pass-through.
//!
//! The caller supplies the N8N base URL, API key, method, endpoint and an
//! optional JSON body. The request is sent once to `{url}/api/v1/{endpoint}`
//! and the upstream status, content type and body are relayed unchanged.
//! There is no retry and no caching.

use std::time::Duration;

use axum::body::Bytes;
use reqwest::{
    header::{HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;
use utoipa::ToSchema;

/// Path prefix of the N8N public API.
const API_PREFIX: &str = "/api/v1";

/// Header N8N reads the API key from.
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Debug, thiserror::Error)]
pub enum N8nError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("N8N did not respond in time")]
    Timeout,

    #[error("Could not reach N8N: {0}")]
    Unreachable(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Body of `POST /api/n8n/proxy`.
///
/// Fields default to empty so that a missing field is reported as a 400 by
/// validation rather than as a deserialization failure.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct N8nProxyRequest {
    /// Base URL of the N8N instance, e.g. `https://n8n.example.com`
    #[serde(default)]
    pub url: String,
    /// N8N API key
    #[serde(default)]
    pub api_key: String,
    /// HTTP method (default `GET`)
    #[serde(default)]
    pub method: Option<String>,
    /// Endpoint below `/api/v1`, e.g. `workflows` or `credentials/5`
    #[serde(default)]
    pub endpoint: String,
    /// JSON body forwarded as-is
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub body: Option<Value>,
}

impl std::fmt::Debug for N8nProxyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("N8nProxyRequest")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// A validated call, ready to send.
pub struct ProxyCall {
    pub method: Method,
    pub target: Url,
    api_key: HeaderValue,
    pub body: Option<Value>,
}

impl ProxyCall {
    pub fn from_request(request: N8nProxyRequest) -> Result<Self, N8nError> {
        if request.url.trim().is_empty() {
            return Err(N8nError::InvalidRequest("url is required".to_string()));
        }
        if request.api_key.trim().is_empty() {
            return Err(N8nError::InvalidRequest("apiKey is required".to_string()));
        }
        if request.endpoint.trim().is_empty() {
            return Err(N8nError::InvalidRequest("endpoint is required".to_string()));
        }

        let method = parse_method(request.method.as_deref())?;
        let target = build_target(&request.url, &request.endpoint)?;

        let mut api_key = HeaderValue::from_str(request.api_key.trim()).map_err(|_| {
            N8nError::InvalidRequest("apiKey contains invalid characters".to_string())
        })?;
        api_key.set_sensitive(true);

        Ok(Self {
            method,
            target,
            api_key,
            body: request.body,
        })
    }
}

/// Upstream answer, relayed verbatim to the caller.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Only the verbs the N8N public API uses.
pub fn parse_method(raw: Option<&str>) -> Result<Method, N8nError> {
    let normalized = raw.map(|m| m.trim().to_ascii_uppercase());
    match normalized.as_deref() {
        None | Some("") | Some("GET") => Ok(Method::GET),
        Some("POST") => Ok(Method::POST),
        Some("PUT") => Ok(Method::PUT),
        Some("PATCH") => Ok(Method::PATCH),
        Some("DELETE") => Ok(Method::DELETE),
        Some(other) => Err(N8nError::InvalidRequest(format!(
            "method {other} is not allowed"
        ))),
    }
}

/// Resolve `{base}/api/v1/{endpoint}`.
///
/// The base must be an absolute http(s) URL without query or fragment. If it
/// already ends in `/api/v1` the prefix is not repeated. The resolved URL must
/// stay on the base URL's origin.
pub fn build_target(base: &str, endpoint: &str) -> Result<Url, N8nError> {
    let invalid_base =
        || N8nError::InvalidRequest("url must be an absolute http(s) URL".to_string());

    let parsed = Url::parse(base.trim()).map_err(|_| invalid_base())?;
    if !matches!(parsed.scheme(), "http" | "https")
        || parsed.host_str().is_none()
        || parsed.query().is_some()
        || parsed.fragment().is_some()
    {
        return Err(invalid_base());
    }

    let endpoint = endpoint.trim().trim_start_matches('/');
    if endpoint.is_empty() {
        return Err(N8nError::InvalidRequest("endpoint is required".to_string()));
    }

    let mut root = parsed.as_str().trim_end_matches('/').to_string();
    if !root.ends_with(API_PREFIX) {
        root.push_str(API_PREFIX);
    }

    let target = Url::parse(&format!("{root}/{endpoint}"))
        .map_err(|e| N8nError::InvalidRequest(format!("endpoint is not a valid path: {e}")))?;

    if target.origin() != parsed.origin() {
        return Err(N8nError::InvalidRequest(
            "endpoint must stay on the N8N host".to_string(),
        ));
    }

    Ok(target)
}

#[derive(Debug, Clone)]
pub struct N8nClient {
    http: Client,
}

impl N8nClient {
    pub fn new(timeout: Duration) -> Result<Self, N8nError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| N8nError::Client(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Send the call once and capture the upstream response.
    pub async fn forward(&self, call: &ProxyCall) -> Result<UpstreamResponse, N8nError> {
        info!(
            method = %call.method,
            host = call.target.host_str().unwrap_or_default(),
            path = call.target.path(),
            "forwarding request to n8n"
        );

        let mut request = self
            .http
            .request(call.method.clone(), call.target.clone())
            .header(API_KEY_HEADER, call.api_key.clone())
            .header(ACCEPT, "application/json");

        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_send_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_send_error)?;

        if status >= 400 {
            warn!(status, path = call.target.path(), "n8n returned an error status");
        } else {
            info!(status, path = call.target.path(), "n8n responded");
        }

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

fn map_send_error(e: reqwest::Error) -> N8nError {
    if e.is_timeout() {
        N8nError::Timeout
    } else if e.is_builder() {
        N8nError::Client(e.to_string())
    } else {
        N8nError::Unreachable(e.without_url().to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;

    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{get, patch, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    pub const TEST_API_KEY: &str = "n8n_api_test_key";

    fn key_ok(headers: &HeaderMap) -> bool {
        headers
            .get("x-n8n-api-key")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == TEST_API_KEY)
    }

    /// Minimal stand-in for the N8N public API, served on a random port.
    pub async fn spawn_fake_n8n() -> SocketAddr {
        let app = Router::new()
            .route(
                "/api/v1/workflows",
                get(|headers: HeaderMap| async move {
                    if !key_ok(&headers) {
                        return (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "unauthorized"})),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(json!({"data": [{"id": "wf1", "name": "Post to TikTok"}]})),
                    )
                }),
            )
            .route(
                "/api/v1/credentials/{id}",
                patch(
                    |Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        if !key_ok(&headers) {
                            return (
                                StatusCode::UNAUTHORIZED,
                                Json(json!({"message": "unauthorized"})),
                            );
                        }
                        (StatusCode::OK, Json(json!({"id": id, "received": body})))
                    },
                ),
            )
            .route(
                "/api/v1/workflows/{id}/activate",
                post(|Path(id): Path<String>| async move {
                    if id == "missing" {
                        return (
                            StatusCode::NOT_FOUND,
                            Json(json!({"message": "Not Found"})),
                        );
                    }
                    (StatusCode::OK, Json(json!({"id": id, "active": true})))
                }),
            )
            .route("/api/v1/plain", get(|| async { "plain text" }))
            .route(
                "/api/v1/slow",
                get(|| async {
                    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                    "late"
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}
