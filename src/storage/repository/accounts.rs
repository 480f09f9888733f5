// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TikTok account repository.
//!
//! Accounts are stored under `owner_id|account_id`, so every lookup is scoped
//! to the requesting user. Another user's account is indistinguishable from
//! a missing one.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::videos::StoredVideo;
use crate::storage::database::{
    owned_key, owner_range, Store, StoreError, StoreResult, ACCOUNTS, VIDEOS,
};

/// Connection state of a TikTok account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Connected and usable for scheduling
    #[default]
    Active,
    /// Temporarily excluded from scheduling by the user
    Paused,
    /// Credentials no longer valid
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAccount {
    pub id: String,
    pub owner_user_id: String,
    /// Always starts with `@`
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub followers: u64,
    pub created_at: DateTime<Utc>,
}

/// Canonical handle form: trimmed, single leading `@`.
pub fn normalize_handle(handle: &str) -> String {
    format!("@{}", handle.trim().trim_start_matches('@'))
}

pub struct AccountRepository<'a> {
    store: &'a Store,
}

impl<'a> AccountRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new account. Handles are unique per owner, ignoring case.
    pub fn create(&self, account: &StoredAccount) -> StoreResult<()> {
        let key = owned_key(&account.owner_user_id, &account.id);
        let json = serde_json::to_vec(account)?;
        let (start, end) = owner_range(&account.owner_user_id);

        let write_txn = self.store.db().begin_write()?;
        {
            let mut table = write_txn.open_table(ACCOUNTS)?;

            for entry in table.range(start.as_str()..end.as_str())? {
                let (_, value) = entry?;
                let existing: StoredAccount = serde_json::from_slice(value.value())?;
                if existing.handle.eq_ignore_ascii_case(&account.handle) {
                    return Err(StoreError::AlreadyExists(format!(
                        "Account {}",
                        account.handle
                    )));
                }
            }

            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get one of the owner's accounts.
    pub fn get(&self, owner_user_id: &str, account_id: &str) -> StoreResult<StoredAccount> {
        let key = owned_key(owner_user_id, account_id);
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(key.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("Account {account_id}"))),
        }
    }

    /// List the owner's accounts, oldest first.
    pub fn list_by_owner(&self, owner_user_id: &str) -> StoreResult<Vec<StoredAccount>> {
        let (start, end) = owner_range(owner_user_id);
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        let mut accounts = Vec::new();
        for entry in table.range(start.as_str()..end.as_str())? {
            let (_, value) = entry?;
            accounts.push(serde_json::from_slice::<StoredAccount>(value.value())?);
        }
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    /// Replace an existing account row.
    pub fn update(&self, account: &StoredAccount) -> StoreResult<()> {
        let key = owned_key(&account.owner_user_id, &account.id);
        let json = serde_json::to_vec(account)?;

        let write_txn = self.store.db().begin_write()?;
        {
            let mut table = write_txn.open_table(ACCOUNTS)?;
            if table.get(key.as_str())?.is_none() {
                return Err(StoreError::NotFound(format!("Account {}", account.id)));
            }
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete an account together with its scheduled videos.
    ///
    /// Returns the number of videos removed.
    pub fn delete(&self, owner_user_id: &str, account_id: &str) -> StoreResult<usize> {
        let key = owned_key(owner_user_id, account_id);
        let (start, end) = owner_range(owner_user_id);

        let write_txn = self.store.db().begin_write()?;
        let removed_videos = {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            if accounts.remove(key.as_str())?.is_none() {
                return Err(StoreError::NotFound(format!("Account {account_id}")));
            }

            let mut videos = write_txn.open_table(VIDEOS)?;
            let mut doomed = Vec::new();
            for entry in videos.range(start.as_str()..end.as_str())? {
                let (video_key, value) = entry?;
                let video: StoredVideo = serde_json::from_slice(value.value())?;
                if video.account_id == account_id {
                    doomed.push(video_key.value().to_string());
                }
            }
            for video_key in &doomed {
                videos.remove(video_key.as_str())?;
            }
            doomed.len()
        };
        write_txn.commit()?;
        Ok(removed_videos)
    }

    /// Number of accounts the owner has connected.
    pub fn count_by_owner(&self, owner_user_id: &str) -> StoreResult<u64> {
        let (start, end) = owner_range(owner_user_id);
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        let mut count = 0;
        for entry in table.range(start.as_str()..end.as_str())? {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}
