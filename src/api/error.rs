//! Shared error envelope for the REST API.
//!
//! Every failure answers with `{"success": false, "statusCode": n,
//! "message": "..."}` so clients can handle all endpoints uniformly.
//! Handlers return `Result<_, ApiError>`; translation to HTTP is done here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, message)
    }

    /// Wrap an unclassified failure. The cause is logged; callers only see a
    /// generic message, with the error chain attached in debug builds.
    #[must_use]
    pub fn internal(err: &anyhow::Error) -> Self {
        error!("Internal server error: {err:#}");

        #[cfg(debug_assertions)]
        let message = format!("Internal Server Error: {err:#}");
        #[cfg(not(debug_assertions))]
        let message = "Internal Server Error".to_string();

        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "statusCode": self.status.as_u16(),
            "message": self.message,
        }));

        (self.status, body).into_response()
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_status() {
        assert_eq!(
            ApiError::bad_request("nope").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("nope").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::not_found("nope").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("nope").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::not_implemented("nope").status(),
            StatusCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn envelope_shape() {
        let response = ApiError::conflict("Email already in use").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn envelope_body() {
        let response = ApiError::conflict("Email already in use").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("read body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(value["success"], serde_json::Value::Bool(false));
        assert_eq!(value["statusCode"], 409);
        assert_eq!(value["message"], "Email already in use");
    }
}
