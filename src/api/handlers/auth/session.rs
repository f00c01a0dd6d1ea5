//! Refresh and logout endpoints.
//!
//! Refresh verifies the presented token cryptographically AND against the
//! stored slot, so logged-out or rotated-away tokens fail even while their
//! signature is still valid. Logout goes the other way: it never verifies the
//! signature, only the stored-value match, and is idempotent.

use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use super::{
    state::AuthState,
    storage,
    types::{LogoutRequest, MessageResponse, RefreshTokenRequest, RefreshTokenResponse},
    utils::hash_token,
};
use crate::{api::error::ApiError, auth::jwt};

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshTokenResponse),
        (status = 401, description = "Missing, invalid, expired, or superseded refresh token"),
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshTokenRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = payload
        .and_then(|Json(payload)| payload.refresh_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("Refresh token required"))?;

    let claims = jwt::verify(&token, state.config().refresh_token_secret())
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;
    let user_id = jwt::subject(&claims)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    // The signed token must also be the one currently stored for the user;
    // logout and re-login both invalidate older tokens this way.
    let stored = storage::fetch_refresh_token_hash(&pool, user_id)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    let matches = stored
        .map(|slot| slot.as_deref() == Some(hash_token(&token).as_str()))
        .unwrap_or(false);
    if !matches {
        debug!("refresh rejected: token does not match stored slot");
        return Err(ApiError::unauthorized("Invalid refresh token"));
    }

    // A refresh issues a new access token only; the refresh token itself is
    // not rotated here.
    let access_token = jwt::issue(
        user_id,
        state.config().access_token_secret(),
        state.config().access_token_ttl_seconds(),
    )
    .map_err(|err| ApiError::internal(&err.into()))?;

    Ok(Json(RefreshTokenResponse {
        success: true,
        access_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Refresh token required"),
    ),
    tag = "auth"
)]
pub async fn logout(
    pool: Extension<PgPool>,
    payload: Option<Json<LogoutRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = payload
        .and_then(|Json(payload)| payload.refresh_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Refresh token required"))?;

    // No signature check here: whoever holds the stored value gets the slot
    // cleared. An unknown token is a no-op success (already logged out).
    let cleared = storage::clear_refresh_token_by_hash(&pool, &hash_token(&token))
        .await
        .map_err(|err| ApiError::internal(&err))?;

    debug!(cleared, "logout processed");

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    }))
}
