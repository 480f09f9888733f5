// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scheduled video repository.
//!
//! Nothing here publishes to TikTok. A video moves from `pending` to
//! `posted` or `failed` only when the client reports it.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::database::{
    owned_key, owner_range, Store, StoreError, StoreResult, ACCOUNTS, VIDEOS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    #[default]
    Pending,
    Posted,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredVideo {
    pub id: String,
    pub owner_user_id: String,
    pub account_id: String,
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub video_url: String,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub status: VideoStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

/// Per-status totals for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoCounts {
    pub pending: u64,
    pub posted: u64,
}

pub struct VideoRepository<'a> {
    store: &'a Store,
}

impl<'a> VideoRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new video. The target account must belong to the same owner.
    pub fn create(&self, video: &StoredVideo) -> StoreResult<()> {
        let account_key = owned_key(&video.owner_user_id, &video.account_id);
        let key = owned_key(&video.owner_user_id, &video.id);
        let json = serde_json::to_vec(video)?;

        let write_txn = self.store.db().begin_write()?;
        {
            let accounts = write_txn.open_table(ACCOUNTS)?;
            if accounts.get(account_key.as_str())?.is_none() {
                return Err(StoreError::NotFound(format!("Account {}", video.account_id)));
            }

            let mut table = write_txn.open_table(VIDEOS)?;
            if table.get(key.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Video {}", video.id)));
            }
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, owner_user_id: &str, video_id: &str) -> StoreResult<StoredVideo> {
        let key = owned_key(owner_user_id, video_id);
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(VIDEOS)?;
        match table.get(key.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("Video {video_id}"))),
        }
    }

    /// List the owner's videos ordered by `scheduled_for`, optionally
    /// filtered by status.
    pub fn list_by_owner(
        &self,
        owner_user_id: &str,
        status: Option<VideoStatus>,
    ) -> StoreResult<Vec<StoredVideo>> {
        let (start, end) = owner_range(owner_user_id);
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(VIDEOS)?;

        let mut videos = Vec::new();
        for entry in table.range(start.as_str()..end.as_str())? {
            let (_, value) = entry?;
            let video: StoredVideo = serde_json::from_slice(value.value())?;
            if status.is_none_or(|s| s == video.status) {
                videos.push(video);
            }
        }
        videos.sort_by(|a, b| {
            a.scheduled_for
                .cmp(&b.scheduled_for)
                .then(a.id.cmp(&b.id))
        });
        Ok(videos)
    }

    /// Mark a pending or failed video as posted.
    pub fn mark_posted(
        &self,
        owner_user_id: &str,
        video_id: &str,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<StoredVideo> {
        self.transition(owner_user_id, video_id, |video| {
            video.status = VideoStatus::Posted;
            video.posted_at = Some(posted_at);
        })
    }

    /// Mark a pending video as failed. Failing twice is a no-op.
    pub fn mark_failed(&self, owner_user_id: &str, video_id: &str) -> StoreResult<StoredVideo> {
        self.transition(owner_user_id, video_id, |video| {
            video.status = VideoStatus::Failed;
        })
    }

    /// Apply a status change to a video that has not been posted yet.
    fn transition(
        &self,
        owner_user_id: &str,
        video_id: &str,
        apply: impl FnOnce(&mut StoredVideo),
    ) -> StoreResult<StoredVideo> {
        let key = owned_key(owner_user_id, video_id);

        let write_txn = self.store.db().begin_write()?;
        let video = {
            let mut table = write_txn.open_table(VIDEOS)?;

            let existing_bytes = {
                let existing = table
                    .get(key.as_str())?
                    .ok_or_else(|| StoreError::NotFound(format!("Video {video_id}")))?;
                existing.value().to_vec()
            };

            let mut video: StoredVideo = serde_json::from_slice(&existing_bytes)?;
            if video.status == VideoStatus::Posted {
                return Err(StoreError::Conflict(format!(
                    "Video {video_id} is already posted"
                )));
            }
            apply(&mut video);

            let json = serde_json::to_vec(&video)?;
            table.insert(key.as_str(), json.as_slice())?;
            video
        };
        write_txn.commit()?;
        Ok(video)
    }

    pub fn delete(&self, owner_user_id: &str, video_id: &str) -> StoreResult<()> {
        let key = owned_key(owner_user_id, video_id);
        let write_txn = self.store.db().begin_write()?;
        {
            let mut table = write_txn.open_table(VIDEOS)?;
            if table.remove(key.as_str())?.is_none() {
                return Err(StoreError::NotFound(format!("Video {video_id}")));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn counts_by_owner(&self, owner_user_id: &str) -> StoreResult<VideoCounts> {
        let mut counts = VideoCounts::default();
        for video in self.list_by_owner(owner_user_id, None)? {
            match video.status {
                VideoStatus::Pending => counts.pending += 1,
                VideoStatus::Posted => counts.posted += 1,
                VideoStatus::Failed => {}
            }
        }
        Ok(counts)
    }
}
