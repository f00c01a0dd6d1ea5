//! Authenticated profile endpoints.
//!
//! Flow Overview:
//! 1) Authenticate via bearer access token.
//! 2) Resolve the current user from the database.
//! 3) Read or replace the profile fields.

use anyhow::{Context, Result};
use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::auth::{
    principal::require_auth,
    storage::UserRecord,
    types::{PublicUser, UpdateMeRequest, UpdatedUserResponse, UserResponse},
    AuthState,
};
use crate::api::error::ApiError;

#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Return the authenticated user profile", body = UserResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "User not found"),
    ),
    tag = "user"
)]
pub async fn get_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state)?;

    let user = fetch_profile(&pool, principal.user_id)
        .await
        .map_err(|err| ApiError::internal(&err))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        success: true,
        user: PublicUser::from(user),
    }))
}

#[utoipa::path(
    put,
    path = "/api/user/me",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Profile updated", body = UpdatedUserResponse),
        (status = 400, description = "Name and avatar are required"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "User not found"),
    ),
    tag = "user"
)]
pub async fn update_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateMeRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state)?;

    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Name and avatar are required"));
    };

    // Both fields are required on every update; partial updates are not
    // accepted.
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let avatar = payload
        .avatar
        .as_deref()
        .map(str::trim)
        .filter(|avatar| !avatar.is_empty());

    let (Some(name), Some(avatar)) = (name, avatar) else {
        return Err(ApiError::bad_request("Name and avatar are required"));
    };

    let user = update_profile(&pool, principal.user_id, name, avatar)
        .await
        .map_err(|err| ApiError::internal(&err))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UpdatedUserResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        user: PublicUser::from(user),
    }))
}

async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>> {
    let query = "
        SELECT id, name, email, avatar, provider
        FROM users
        WHERE id = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch profile")?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        provider: row.get("provider"),
    }))
}

async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    avatar: &str,
) -> Result<Option<UserRecord>> {
    let query = "
        UPDATE users
        SET name = $2,
            avatar = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, email, avatar, provider
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(name)
        .bind(avatar)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update profile")?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        provider: row.get("provider"),
    }))
}
