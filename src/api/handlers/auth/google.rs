//! Google federated login.
//!
//! The raw ID token is verified through the identity verifier injected into
//! the auth state; first-time logins create a `provider=google` user. A local
//! account is never silently converted to federated login.

use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::{
    issue_session,
    state::AuthState,
    storage::{self, InsertOutcome},
    types::{AuthResponse, GoogleLoginRequest},
    utils::normalize_email,
};
use crate::api::error::ApiError;

#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing ID token, missing email claim, or local-account conflict"),
        (status = 401, description = "Invalid Google ID token"),
        (status = 501, description = "Google auth not configured on server"),
    ),
    tag = "auth"
)]
pub async fn google_login(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<GoogleLoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(verifier) = state.google() else {
        return Err(ApiError::not_implemented(
            "Google auth not configured on server",
        ));
    };

    let id_token = payload
        .and_then(|Json(payload)| payload.id_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("ID token required"))?;

    let claims = verifier.verify(&id_token).await.map_err(|err| {
        error!("Identity token verification failed: {err}");
        ApiError::unauthorized("Invalid Google ID token")
    })?;

    let Some(email) = claims.email else {
        return Err(ApiError::bad_request("Email not found in token"));
    };
    let email = normalize_email(&email);

    let existing = storage::find_user_by_email(&pool, &email)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    let user = match existing {
        Some(user) if user.provider == "local" => {
            return Err(ApiError::bad_request(
                "Email already registered with password. Use password login.",
            ));
        }
        Some(user) => user,
        None => {
            let name = claims
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Google User".to_string());
            let avatar = claims.picture.unwrap_or_default();

            match storage::insert_google_user(&pool, &name, &email, &avatar)
                .await
                .map_err(|err| ApiError::internal(&err))?
            {
                InsertOutcome::Created(user) => {
                    info!(user_id = %user.id, "federated user created");
                    user
                }
                // Lost a creation race; the email exists now.
                InsertOutcome::Conflict => return Err(ApiError::conflict("Email already in use")),
            }
        }
    };

    let response = issue_session(&pool, &state, user)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    Ok(Json(response))
}
