// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the database.
//!
//! Each repository provides CRUD operations for a specific entity type.

pub mod accounts;
pub mod users;
pub mod videos;

pub use accounts::{normalize_handle, AccountRepository, AccountStatus, StoredAccount};
pub use users::{normalize_email, StoredUser, UserRepository};
pub use videos::{StoredVideo, VideoCounts, VideoRepository, VideoStatus};
