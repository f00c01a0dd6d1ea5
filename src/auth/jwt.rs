//! JWT issuance and verification for access and refresh tokens.
//!
//! Both token kinds are HS256 JWTs carrying the user id as `sub`. They are
//! signed with distinct secrets so that compromise of one kind cannot forge
//! the other; callers pick the secret, this module does not hold state.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Sign(String),
}

/// Issue a signed token for `user_id` expiring `ttl_seconds` from now.
///
/// # Errors
/// Returns [`TokenError::Sign`] if claim encoding fails.
pub fn issue(user_id: Uuid, secret: &str, ttl_seconds: i64) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| TokenError::Sign(err.to_string()))
}

/// Verify a token signature and expiry, returning the decoded claims.
///
/// # Errors
/// Returns [`TokenError::Expired`] when the token is past its expiry and
/// [`TokenError::Invalid`] on any other verification failure, including a
/// token signed with a different secret.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

/// Extract the `sub` claim as a user id.
///
/// # Errors
/// Returns [`TokenError::Invalid`] when the subject is not a valid UUID.
pub fn subject(claims: &Claims) -> Result<Uuid, TokenError> {
    Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)
}
