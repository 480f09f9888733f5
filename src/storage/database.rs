// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded application database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `user_emails`: lowercase email → user_id (uniqueness index)
//! - `accounts`: `owner_id|account_id` → serialized StoredAccount
//! - `videos`: `owner_id|video_id` → serialized StoredVideo
//!
//! Owner-scoped tables use a composite key so that listing a user's rows is a
//! single range scan and a row can never be addressed without its owner.

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

pub(crate) const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");

pub(crate) const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

pub(crate) const VIDEOS: TableDefinition<&str, &[u8]> = TableDefinition::new("videos");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Key Helpers
// =============================================================================

/// Upper bound character for owner-prefix range scans.
const KEY_END: char = '\u{10FFFF}';

/// Composite key for owner-scoped tables: `owner_id|row_id`.
pub(crate) fn owned_key(owner_user_id: &str, id: &str) -> String {
    format!("{owner_user_id}|{id}")
}

/// Half-open key range covering every row of one owner.
pub(crate) fn owner_range(owner_user_id: &str) -> (String, String) {
    (
        format!("{owner_user_id}|"),
        format!("{owner_user_id}|{KEY_END}"),
    )
}

// =============================================================================
// Store
// =============================================================================

/// Handle to the application database.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAILS)?;
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(VIDEOS)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "database opened");
        Ok(Self { db })
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    /// Whether a read transaction can be opened against the users table.
    pub fn is_healthy(&self) -> bool {
        self.db
            .begin_read()
            .map_err(StoreError::from)
            .and_then(|txn| txn.open_table(USERS).map_err(StoreError::from))
            .is_ok()
    }
}
