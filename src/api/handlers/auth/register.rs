use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::{
    issue_session,
    state::AuthState,
    storage::{self, InsertOutcome},
    types::{AuthResponse, RegisterRequest},
    utils::{normalize_email, valid_email, MIN_PASSWORD_LENGTH},
};
use crate::{api::error::ApiError, auth::password};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already in use"),
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }

    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }

    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let password_hash =
        password::hash(&payload.password).map_err(|err| ApiError::internal(&err.into()))?;

    let user = match storage::insert_local_user(&pool, name, &email, &password_hash)
        .await
        .map_err(|err| ApiError::internal(&err))?
    {
        InsertOutcome::Created(user) => user,
        InsertOutcome::Conflict => return Err(ApiError::conflict("Email already in use")),
    };

    info!(user_id = %user.id, "user registered");

    let response = issue_session(&pool, &state, user)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    Ok((StatusCode::CREATED, Json(response)))
}
