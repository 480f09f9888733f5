// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scheduled video endpoints.
//!
//! The backend only keeps the schedule. Nothing is published to TikTok from
//! here; the client flips a video to `posted` once it went out, or to
//! `failed` when publishing did not work.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::{
    api::extract::{ApiJson, ApiQuery},
    auth::Auth,
    error::ApiError,
    models::{CreateVideoRequest, ScheduledVideo, VideoListResponse},
    state::AppState,
    storage::{StoredVideo, VideoRepository, VideoStatus},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct VideoListQuery {
    /// Only return videos in this state
    pub status: Option<VideoStatus>,
}

/// List the caller's scheduled videos ordered by `scheduledFor`.
#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "Videos",
    security(("bearer_auth" = [])),
    params(VideoListQuery),
    responses(
        (status = 200, description = "Scheduled videos", body = VideoListResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_videos(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VideoListQuery>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let videos: Vec<ScheduledVideo> = VideoRepository::new(&state.store)
        .list_by_owner(&user.user_id, query.status)?
        .into_iter()
        .map(ScheduledVideo::from)
        .collect();
    let total = videos.len();

    Ok(Json(VideoListResponse { videos, total }))
}

/// Schedule a video on one of the caller's accounts.
#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "Videos",
    security(("bearer_auth" = [])),
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video scheduled", body = ScheduledVideo),
        (status = 400, description = "Missing title or video URL"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn create_video(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVideoRequest>,
) -> Result<(StatusCode, Json<ScheduledVideo>), ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    let video_url = request.video_url.trim();
    if video_url.is_empty() {
        return Err(ApiError::bad_request("videoUrl is required"));
    }

    let video = StoredVideo {
        id: uuid::Uuid::new_v4().to_string(),
        owner_user_id: user.user_id.clone(),
        account_id: request.account_id,
        title: title.to_string(),
        caption: request.caption.filter(|c| !c.trim().is_empty()),
        video_url: video_url.to_string(),
        scheduled_for: request.scheduled_for,
        status: VideoStatus::Pending,
        created_at: Utc::now(),
        posted_at: None,
    };

    VideoRepository::new(&state.store).create(&video)?;
    info!(
        user_id = %user.user_id,
        video_id = %video.id,
        account_id = %video.account_id,
        scheduled_for = %video.scheduled_for,
        "video scheduled"
    );

    Ok((StatusCode::CREATED, Json(video.into())))
}

/// Mark a video as posted.
#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/posted",
    tag = "Videos",
    security(("bearer_auth" = [])),
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video marked as posted", body = ScheduledVideo),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found"),
        (status = 409, description = "Video already posted")
    )
)]
pub async fn mark_video_posted(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<ScheduledVideo>, ApiError> {
    let video =
        VideoRepository::new(&state.store).mark_posted(&user.user_id, &video_id, Utc::now())?;
    info!(user_id = %user.user_id, video_id = %video.id, "video marked as posted");
    Ok(Json(video.into()))
}

/// Mark a video as failed, for example when the client could not publish it.
#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/failed",
    tag = "Videos",
    security(("bearer_auth" = [])),
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video marked as failed", body = ScheduledVideo),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found"),
        (status = 409, description = "Video already posted")
    )
)]
pub async fn mark_video_failed(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<ScheduledVideo>, ApiError> {
    let video = VideoRepository::new(&state.store).mark_failed(&user.user_id, &video_id)?;
    info!(user_id = %user.user_id, video_id = %video.id, "video marked as failed");
    Ok(Json(video.into()))
}

/// Remove a video from the schedule.
#[utoipa::path(
    delete,
    path = "/api/videos/{video_id}",
    tag = "Videos",
    security(("bearer_auth" = [])),
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn delete_video(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    VideoRepository::new(&state.store).delete(&user.user_id, &video_id)?;
    Ok(StatusCode::NO_CONTENT)
}
