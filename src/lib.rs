// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filper API - backend for the Filper TikTok scheduling dashboard
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Password hashing, session tokens and the `Auth` extractor
//! - `config` - Environment configuration
//! - `providers` - Outbound integrations (N8N)
//! - `storage` - Embedded redb database and repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
