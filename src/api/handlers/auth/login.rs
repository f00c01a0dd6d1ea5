use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use super::{
    issue_session,
    state::AuthState,
    storage,
    types::{AuthResponse, LoginRequest},
    utils::normalize_email,
};
use crate::{api::error::ApiError, auth::password};

/// One message for every failure cause so callers cannot probe which check
/// failed: unknown email, federated-only account, or wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    let email = normalize_email(&payload.email);

    let record = storage::find_credentials_by_email(&pool, &email)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    let Some(record) = record else {
        debug!("login rejected: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if record.user.provider != "local" {
        debug!("login rejected: federated account");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let Some(password_hash) = record.password_hash else {
        debug!("login rejected: no password hash");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let matches = password::verify(&payload.password, &password_hash)
        .map_err(|err| ApiError::internal(&err.into()))?;
    if !matches {
        debug!("login rejected: password mismatch");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let response = issue_session(&pool, &state, record.user)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    Ok(Json(response))
}
