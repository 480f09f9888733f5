// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification (HS256).

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{claims::Claims, AuthError, AuthenticatedUser};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token bound to `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| AuthError::InternalError("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry, returning the token's user.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-value";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let service = service();
        let token = service.issue("user-42").unwrap();

        let user = service.verify(&token).unwrap();
        assert_eq!(user.user_id, "user-42");
        assert!(user.expires_at > Utc::now().timestamp());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = TokenService::new("another-secret-entirely", Duration::from_secs(3600))
            .issue("user-42")
            .unwrap();

        assert!(matches!(
            service().verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-42".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service().verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn unrepresentable_lifetime_is_an_error() {
        let service = TokenService::new(SECRET, Duration::from_secs(u64::MAX));
        assert!(matches!(
            service.issue("user-42"),
            Err(AuthError::InternalError(_))
        ));

        // Large but valid lifetimes never wrap into the past
        let service = TokenService::new(SECRET, Duration::from_secs(87_600 * 3600));
        let user = service.verify(&service.issue("user-42").unwrap()).unwrap();
        assert!(user.expires_at > Utc::now().timestamp());
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            service().verify("not.a.jwt"),
            Err(AuthError::MalformedToken)
        ));
    }
}
