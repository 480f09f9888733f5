// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification (bcrypt).
//!
//! bcrypt is CPU-bound on purpose, so both directions run on the blocking
//! thread pool instead of stalling the async workers.

use super::AuthError;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Plaintext used to build the dummy hash. Never matches a real login
/// because it is only compared when no user row exists.
const DUMMY_PASSWORD: &str = "filper-dummy-password-for-timing";

#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash checked when the email is unknown, so that a miss costs the same
    /// as a wrong password.
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh salt.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::InternalError(format!("hashing task failed: {e}")))?
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))
    }

    /// Compare a plaintext password against a stored hash.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::InternalError(format!("verify task failed: {e}")))?
            .map_err(|e| AuthError::InternalError(format!("password verification failed: {e}")))
    }

    /// Burn the same work as a real verification and report no match.
    pub async fn verify_dummy(&self, password: &str) -> Result<bool, AuthError> {
        let dummy_hash = self.dummy_hash.clone();
        self.verify(password, &dummy_hash).await.map(|_| false)
    }
}
