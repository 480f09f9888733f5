// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    models::StatsResponse,
    state::AppState,
    storage::{AccountRepository, VideoRepository},
};

/// Dashboard counters for the authenticated user.
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = StatsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_stats(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let accounts_count = AccountRepository::new(&state.store).count_by_owner(&user.user_id)?;
    let videos = VideoRepository::new(&state.store).counts_by_owner(&user.user_id)?;

    Ok(Json(StatsResponse {
        accounts_count,
        scheduled_videos: videos.pending,
        posted_videos: videos.posted,
        new_followers: 0,
    }))
}
