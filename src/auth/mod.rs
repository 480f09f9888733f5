// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Email/password authentication with self-issued session tokens.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/auth/register` or `/api/auth/login` with email + password
//! 2. Server hashes (register) or verifies (login) the password with bcrypt
//! 3. Server returns an HS256 JWT whose `sub` is the user row id
//! 4. Frontend sends `Authorization: Bearer <token>` on protected routes
//!
//! ## Security
//!
//! - Plaintext passwords are never stored or logged
//! - Login failures return one uniform error, whichever half was wrong
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod tokens;

pub use claims::{AuthenticatedUser, Claims};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{PasswordHasher, MIN_PASSWORD_LEN};
pub use tokens::TokenService;
