// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are keyed by id. A second table maps the normalized email to the id
//! and is the source of truth for the one-account-per-email rule.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::storage::database::{Store, StoreError, StoreResult, USERS, USER_EMAILS};

/// User row. `password_hash` is a bcrypt hash and never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: String,
    /// Lowercase, trimmed email
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Canonical form used for email lookups and uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new user.
    ///
    /// The email check and both inserts share one write transaction, so two
    /// concurrent registrations for the same email cannot both succeed.
    pub fn create(&self, user: &StoredUser) -> StoreResult<()> {
        let email = normalize_email(&user.email);
        let json = serde_json::to_vec(user)?;

        let write_txn = self.store.db().begin_write()?;
        {
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            if emails.get(email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists("User".to_string()));
            }

            let mut users = write_txn.open_table(USERS)?;
            if users.get(user.id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("User {}", user.id)));
            }

            users.insert(user.id.as_str(), json.as_slice())?;
            emails.insert(email.as_str(), user.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a user by id.
    pub fn get(&self, user_id: &str) -> StoreResult<StoredUser> {
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("User {user_id}"))),
        }
    }

    /// Look up a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let email = normalize_email(email);
        let read_txn = self.store.db().begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;

        let user_id = match emails.get(email.as_str())? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(user_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => {
                tracing::warn!(user_id = %user_id, "email index points at a missing user");
                Ok(None)
            }
        }
    }
}
