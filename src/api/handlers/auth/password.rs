//! Password reset: the forgot/reset side-channel.
//!
//! Forgot-password always answers 200 with the same body so account
//! existence never leaks. Mail delivery failures are swallowed; the reset
//! link then goes to the operational log instead of failing the request.

use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    state::AuthState,
    storage,
    types::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest},
    utils::{
        build_reset_url, generate_reset_token, hash_token, normalize_email, MIN_PASSWORD_LENGTH,
    },
};
use crate::{
    api::{error::ApiError, mail::MailMessage},
    auth::password,
};

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Always reported, whether or not the account exists", body = MessageResponse),
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    let email = normalize_email(&payload.email);

    let token = generate_reset_token().map_err(|err| ApiError::internal(&err))?;

    let armed = storage::set_reset_token(
        &pool,
        &email,
        &hash_token(&token),
        state.config().reset_token_ttl_seconds(),
    )
    .await
    .map_err(|err| ApiError::internal(&err))?;

    if armed {
        let reset_url = build_reset_url(state.config().frontend_base_url(), &token);
        let message = MailMessage {
            to: email.clone(),
            subject: "Password reset for your account".to_string(),
            text: format!(
                "You requested a password reset. Use this link (valid for 15 minutes): {reset_url}"
            ),
            html: format!(
                "<p>You requested a password reset. Use this link (valid for 15 minutes):</p>\
                 <p><a href=\"{reset_url}\">{reset_url}</a></p>"
            ),
        };

        match state.mailer().send(&message).await {
            Ok(()) => info!(%email, "reset email sent"),
            Err(err) => {
                warn!("Email sending failed: {err:#}");
                info!(%email, "reset link: {reset_url}");
            }
        }
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "If email exists, reset link sent".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Invalid or expired token"),
    ),
    tag = "auth"
)]
pub async fn reset_password(
    pool: Extension<PgPool>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let password_hash =
        password::hash(&payload.password).map_err(|err| ApiError::internal(&err.into()))?;

    // Match and consume in one statement; an expired token never matches even
    // when the string is exactly right.
    let consumed = storage::consume_reset_token(&pool, &hash_token(&payload.token), &password_hash)
        .await
        .map_err(|err| ApiError::internal(&err))?;

    if !consumed {
        return Err(ApiError::bad_request("Invalid or expired token"));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Password reset successful".to_string(),
    }))
}
