//! Authenticated principal extraction for protected routes.

use axum::http::HeaderMap;
use uuid::Uuid;

use super::{state::AuthState, utils::extract_bearer_token};
use crate::{api::error::ApiError, auth::jwt};

/// Authenticated user context derived from a bearer access token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Resolve the `Authorization` header into a principal, or return 401.
///
/// # Errors
/// Returns 401 when the header is missing, the signature/expiry check fails,
/// or the subject claim is not a user id.
pub fn require_auth(headers: &HeaderMap, state: &AuthState) -> Result<Principal, ApiError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let claims = jwt::verify(&token, state.config().access_token_secret())
        .map_err(|_| ApiError::unauthorized("Invalid or expired access token"))?;

    let user_id =
        jwt::subject(&claims).map_err(|_| ApiError::unauthorized("Invalid or expired access token"))?;

    Ok(Principal { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        handlers::auth::state::AuthConfig,
        mail::LogMailSender,
    };
    use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn state() -> AuthState {
        let config = AuthConfig::new(
            "http://localhost:5173".to_string(),
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        );
        AuthState::new(config, Arc::new(LogMailSender), None)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
        );
        headers
    }

    #[test]
    fn accepts_valid_access_token() {
        let state = state();
        let user_id = Uuid::new_v4();
        let token = jwt::issue(user_id, state.config().access_token_secret(), 60)
            .expect("issue token");

        let principal = require_auth(&bearer(&token), &state).expect("principal");
        assert_eq!(principal.user_id, user_id);
    }

    #[test]
    fn rejects_missing_header() {
        let state = state();
        let err = require_auth(&HeaderMap::new(), &state).expect_err("no auth");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rejects_refresh_token_on_protected_route() {
        // A refresh token is signed with the other secret and must not pass.
        let state = state();
        let token = jwt::issue(Uuid::new_v4(), state.config().refresh_token_secret(), 60)
            .expect("issue token");

        let err = require_auth(&bearer(&token), &state).expect_err("wrong secret");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rejects_expired_access_token() {
        let state = state();
        let token = jwt::issue(Uuid::new_v4(), state.config().access_token_secret(), -120)
            .expect("issue token");

        let err = require_auth(&bearer(&token), &state).expect_err("expired");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
