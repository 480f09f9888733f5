// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage in a single embedded redb database file
//! (`$DATA_DIR/filper.redb`). Records are stored as JSON values.
//!
//! ## Storage Layout
//!
//! ```text
//! users        user_id            -> StoredUser
//! user_emails  email              -> user_id
//! accounts     owner_id|acc_id    -> StoredAccount
//! videos       owner_id|video_id  -> StoredVideo
//! ```
//!
//! Handlers never touch tables directly; they go through the repositories.

pub mod database;
pub mod repository;

pub use database::{Store, StoreError, StoreResult};
pub use repository::{
    AccountRepository, AccountStatus, StoredAccount, StoredUser, StoredVideo, UserRepository,
    VideoCounts, VideoRepository, VideoStatus,
};
