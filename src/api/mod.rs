// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::CorsOrigins,
    models::{
        Account, AccountListResponse, AuthResponse, CreateAccountRequest, CreateVideoRequest,
        LoginRequest, RegisterRequest, ScheduledVideo, StatsResponse, UpdateAccountRequest,
        UserProfile, VideoListResponse,
    },
    providers::n8n::N8nProxyRequest,
    state::AppState,
    storage::{AccountStatus, VideoStatus},
};

pub mod accounts;
pub mod auth;
pub mod extract;
pub mod health;
pub mod n8n;
pub mod stats;
pub mod videos;

pub fn router(state: AppState, cors: &CorsOrigins) -> Router {
    let api_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/accounts/{account_id}",
            get(accounts::get_account)
                .patch(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route(
            "/videos",
            get(videos::list_videos).post(videos::create_video),
        )
        .route("/videos/{video_id}", delete(videos::delete_video))
        .route(
            "/videos/{video_id}/posted",
            post(videos::mark_video_posted),
        )
        .route(
            "/videos/{video_id}/failed",
            post(videos::mark_video_failed),
        )
        .route("/stats", get(stats::get_stats))
        .route("/n8n/proxy", post(n8n::proxy));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(cors))
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::permissive(),
        CorsOrigins::List(list) => {
            let allowed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        health::liveness,
        auth::register,
        auth::login,
        auth::me,
        accounts::list_accounts,
        accounts::create_account,
        accounts::get_account,
        accounts::update_account,
        accounts::delete_account,
        videos::list_videos,
        videos::create_video,
        videos::mark_video_posted,
        videos::mark_video_failed,
        videos::delete_video,
        stats::get_stats,
        n8n::proxy
    ),
    components(
        schemas(
            UserProfile,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            Account,
            AccountStatus,
            CreateAccountRequest,
            UpdateAccountRequest,
            AccountListResponse,
            ScheduledVideo,
            VideoStatus,
            CreateVideoRequest,
            VideoListResponse,
            StatsResponse,
            N8nProxyRequest,
            health::HealthStatus,
            health::LiveResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Landing page and probes"),
        (name = "Auth", description = "Registration, login and session"),
        (name = "Accounts", description = "Connected TikTok accounts"),
        (name = "Videos", description = "Scheduled videos"),
        (name = "Stats", description = "Dashboard counters"),
        (name = "N8N", description = "Pass-through to the N8N public API")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::providers::n8n::test_support::{spawn_fake_n8n, TEST_API_KEY};
    use crate::state::test_support::test_state;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_user(app: &Router, email: &str) -> String {
        let response = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": email, "password": "s3cret-pass", "name": "Ana"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn register_login_me_flow() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);

        register_user(&app, "ana@example.com").await;

        let response = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "Ana@Example.com", "password": "s3cret-pass"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(body["user"]["email"], "ana@example.com");
        assert!(body["user"].get("password_hash").is_none());

        let response = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Ana");
    }

    #[tokio::test]
    async fn login_errors_are_uniform() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);
        register_user(&app, "ana@example.com").await;

        let wrong = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ana@example.com", "password": "nope-nope"})),
        )
        .await;
        let unknown = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "who@example.com", "password": "s3cret-pass"})),
        )
        .await;

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(wrong).await, json_body(unknown).await);
    }

    #[tokio::test]
    async fn register_validation_and_duplicates() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);
        register_user(&app, "ana@example.com").await;

        let duplicate = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "ANA@example.com", "password": "another-pass"})),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let missing = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "bob@example.com"})),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(missing).await["error"].is_string());
    }

    #[tokio::test]
    async fn unparseable_requests_get_json_errors() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);
        let token = register_user(&app, "ana@example.com").await;

        let response = send_raw(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some("application/json"),
            "{not json",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());

        let response = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": 5, "password": "s3cret-pass"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(response).await["error"].is_string());

        let response = send(
            &app,
            Method::POST,
            "/api/videos",
            Some(&token),
            Some(json!({
                "accountId": "acc-1",
                "title": "Clip",
                "videoUrl": "https://cdn.example.com/v.mp4"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error = json_body(response).await["error"].as_str().unwrap().to_string();
        assert!(error.contains("scheduledFor"), "{error}");

        let response = send(&app, Method::GET, "/api/videos?status=bogus", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());

        let response = send_raw(
            &app,
            Method::POST,
            "/api/accounts",
            Some(&token),
            None,
            r#"{"handle":"ana"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);

        for (method, uri) in [
            (Method::GET, "/api/auth/me"),
            (Method::GET, "/api/accounts"),
            (Method::GET, "/api/videos"),
            (Method::GET, "/api/stats"),
            (Method::POST, "/api/n8n/proxy"),
        ] {
            let response = send(&app, method, uri, None, Some(json!({}))).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            let body = json_body(response).await;
            assert!(body["error_code"].is_string(), "{uri}");
        }

        let response = send(&app, Method::GET, "/api/stats", Some("not-a-jwt"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accounts_videos_and_stats() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);
        let ana = register_user(&app, "ana@example.com").await;
        let bob = register_user(&app, "bob@example.com").await;

        let response = send(
            &app,
            Method::POST,
            "/api/accounts",
            Some(&ana),
            Some(json!({"handle": "anadances", "displayName": "Ana"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let account = json_body(response).await;
        let account_id = account["id"].as_str().unwrap().to_string();
        assert_eq!(account["handle"], "@anadances");

        for (title, at) in [("Second", "2026-03-02T10:00:00Z"), ("First", "2026-03-01T10:00:00Z")] {
            let response = send(
                &app,
                Method::POST,
                "/api/videos",
                Some(&ana),
                Some(json!({
                    "accountId": account_id,
                    "title": title,
                    "videoUrl": "https://cdn.example.com/v.mp4",
                    "scheduledFor": at
                })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let list = json_body(send(&app, Method::GET, "/api/videos", Some(&ana), None).await).await;
        assert_eq!(list["total"], 2);
        assert_eq!(list["videos"][0]["title"], "First");
        let first_id = list["videos"][0]["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            Method::POST,
            &format!("/api/videos/{first_id}/posted"),
            Some(&ana),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            Method::POST,
            &format!("/api/videos/{first_id}/failed"),
            Some(&ana),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(json_body(response).await["error"].is_string());

        let pending =
            json_body(send(&app, Method::GET, "/api/videos?status=pending", Some(&ana), None).await)
                .await;
        assert_eq!(pending["total"], 1);
        assert_eq!(pending["videos"][0]["title"], "Second");

        let stats = json_body(send(&app, Method::GET, "/api/stats", Some(&ana), None).await).await;
        assert_eq!(
            stats,
            json!({"accountsCount": 1, "scheduledVideos": 1, "postedVideos": 1, "newFollowers": 0})
        );

        // Bob cannot see or touch Ana's account
        let response = send(
            &app,
            Method::GET,
            &format!("/api/accounts/{account_id}"),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            Method::PATCH,
            &format!("/api/accounts/{account_id}"),
            Some(&ana),
            Some(json!({"status": "paused", "followers": 42})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "paused");

        let response = send(
            &app,
            Method::DELETE,
            &format!("/api/accounts/{account_id}"),
            Some(&ana),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let stats = json_body(send(&app, Method::GET, "/api/stats", Some(&ana), None).await).await;
        assert_eq!(stats["accountsCount"], 0);
        assert_eq!(stats["scheduledVideos"], 0);
        assert_eq!(stats["postedVideos"], 0);
    }

    #[tokio::test]
    async fn proxy_relays_through_router() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::Any);
        let token = register_user(&app, "ana@example.com").await;
        let addr = spawn_fake_n8n().await;

        let response = send(
            &app,
            Method::POST,
            "/api/n8n/proxy",
            Some(&token),
            Some(json!({
                "url": format!("http://{addr}"),
                "apiKey": TEST_API_KEY,
                "endpoint": "workflows"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"][0]["name"], "Post to TikTok");

        let response = send(
            &app,
            Method::POST,
            "/api/n8n/proxy",
            Some(&token),
            Some(json!({"url": format!("http://{addr}"), "endpoint": "workflows"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_docs_and_request_id() {
        let (state, _dir) = test_state();
        let app = router(state, &CorsOrigins::List(vec!["http://localhost:3000".into()]));

        let response = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dbConnected"], true);

        let response = send(&app, Method::GET, "/", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/api/n8n/proxy"].is_object());
        assert!(doc["paths"]["/api/videos/{video_id}/failed"]["post"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
