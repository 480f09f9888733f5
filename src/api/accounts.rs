// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TikTok account endpoints.
//!
//! Every operation is scoped to the authenticated user. Accounts owned by
//! someone else are reported as 404, never 403.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::{
    api::extract::ApiJson,
    auth::Auth,
    error::ApiError,
    models::{Account, AccountListResponse, CreateAccountRequest, UpdateAccountRequest},
    state::AppState,
    storage::{repository::normalize_handle, AccountRepository, AccountStatus, StoredAccount},
};

fn clean_display_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// List the caller's accounts, oldest first.
#[utoipa::path(
    get,
    path = "/api/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts owned by the caller", body = AccountListResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_accounts(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<AccountListResponse>, ApiError> {
    let accounts: Vec<Account> = AccountRepository::new(&state.store)
        .list_by_owner(&user.user_id)?
        .into_iter()
        .map(Account::from)
        .collect();
    let total = accounts.len();

    Ok(Json(AccountListResponse { accounts, total }))
}

/// Connect a TikTok account.
#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account connected", body = Account),
        (status = 400, description = "Missing handle or handle with spaces"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Handle already connected")
    )
)]
pub async fn create_account(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let handle = normalize_handle(&request.handle);
    if handle.len() < 2 {
        return Err(ApiError::bad_request("handle is required"));
    }
    if handle.chars().any(char::is_whitespace) {
        return Err(ApiError::bad_request("handle must not contain spaces"));
    }

    let account = StoredAccount {
        id: uuid::Uuid::new_v4().to_string(),
        owner_user_id: user.user_id.clone(),
        handle,
        display_name: clean_display_name(request.display_name),
        status: AccountStatus::Active,
        followers: 0,
        created_at: Utc::now(),
    };

    AccountRepository::new(&state.store).create(&account)?;
    info!(user_id = %user.user_id, account_id = %account.id, "account connected");

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Get one of the caller's accounts.
#[utoipa::path(
    get,
    path = "/api/accounts/{account_id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("account_id" = String, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = Account),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(&state.store).get(&user.user_id, &account_id)?;
    Ok(Json(account.into()))
}

/// Update status, display name or follower count.
#[utoipa::path(
    patch,
    path = "/api/accounts/{account_id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("account_id" = String, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = Account),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_account(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    ApiJson(request): ApiJson<UpdateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    let repo = AccountRepository::new(&state.store);
    let mut account = repo.get(&user.user_id, &account_id)?;

    if let Some(name) = request.display_name {
        account.display_name = clean_display_name(Some(name));
    }
    if let Some(status) = request.status {
        account.status = status;
    }
    if let Some(followers) = request.followers {
        account.followers = followers;
    }

    repo.update(&account)?;
    Ok(Json(account.into()))
}

/// Disconnect an account and drop its scheduled videos.
#[utoipa::path(
    delete,
    path = "/api/accounts/{account_id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("account_id" = String, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_account(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed_videos =
        AccountRepository::new(&state.store).delete(&user.user_id, &account_id)?;
    info!(
        user_id = %user.user_id,
        account_id = %account_id,
        removed_videos,
        "account deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
