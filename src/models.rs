// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. Field names are camelCase on
//! the wire, matching what the dashboard frontend reads and sends.
//!
//! Storage rows (`Stored*`) are never serialized directly; they are converted
//! here so that owner ids and password hashes stay server-side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{AccountStatus, StoredAccount, StoredUser, StoredVideo, VideoStatus};

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<StoredUser> for UserProfile {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Registration form. Missing strings deserialize as empty and fail
/// validation with a 400.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub user: UserProfile,
}

// =============================================================================
// Account Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub status: AccountStatus,
    pub followers: u64,
    pub created_at: DateTime<Utc>,
}

impl From<StoredAccount> for Account {
    fn from(account: StoredAccount) -> Self {
        Self {
            id: account.id,
            handle: account.handle,
            display_name: account.display_name,
            status: account.status,
            followers: account.followers,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// TikTok handle, with or without the leading `@`
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
    #[serde(default)]
    pub followers: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountListResponse {
    pub accounts: Vec<Account>,
    pub total: usize,
}

// =============================================================================
// Video Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledVideo {
    pub id: String,
    pub account_id: String,
    pub title: String,
    pub caption: Option<String>,
    pub video_url: String,
    pub scheduled_for: DateTime<Utc>,
    pub status: VideoStatus,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl From<StoredVideo> for ScheduledVideo {
    fn from(video: StoredVideo) -> Self {
        Self {
            id: video.id,
            account_id: video.account_id,
            title: video.title,
            caption: video.caption,
            video_url: video.video_url,
            scheduled_for: video.scheduled_for,
            status: video.status,
            created_at: video.created_at,
            posted_at: video.posted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub video_url: String,
    pub scheduled_for: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoListResponse {
    pub videos: Vec<ScheduledVideo>,
    pub total: usize,
}

// =============================================================================
// Stats Models
// =============================================================================

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub accounts_count: u64,
    /// Videos still pending
    pub scheduled_videos: u64,
    pub posted_videos: u64,
    /// Always 0: follower deltas need a TikTok integration
    pub new_followers: u64,
}
