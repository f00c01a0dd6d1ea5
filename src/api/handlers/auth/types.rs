//! Request/response types for auth endpoints.
//!
//! Body fields keep the camelCase names the frontend already speaks
//! (`refreshToken`, `idToken`, ...). Success responses carry
//! `"success": true` so they share an envelope with the error responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::storage::UserRecord;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateMeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// User fields safe to return to callers. Never carries the password hash or
/// any stored token material.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub provider: String,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            email: record.email,
            avatar: record.avatar,
            provider: record.provider,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub success: bool,
    pub access_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdatedUserResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn refresh_request_uses_camel_case() {
        let decoded: RefreshTokenRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).expect("decode");
        assert_eq!(decoded.refresh_token.as_deref(), Some("abc"));

        let decoded: RefreshTokenRequest = serde_json::from_str("{}").expect("decode empty");
        assert_eq!(decoded.refresh_token, None);
    }

    #[test]
    fn google_request_uses_camel_case() {
        let decoded: GoogleLoginRequest =
            serde_json::from_str(r#"{"idToken":"abc"}"#).expect("decode");
        assert_eq!(decoded.id_token.as_deref(), Some("abc"));
    }

    #[test]
    fn auth_response_serializes_camel_case() {
        let response = AuthResponse {
            success: true,
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user: PublicUser {
                id: Uuid::nil().to_string(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                avatar: String::new(),
                provider: "local".to_string(),
            },
        };

        let value = serde_json::to_value(&response).expect("encode");
        assert_eq!(value["success"], serde_json::Value::Bool(true));
        assert_eq!(value["accessToken"], "access");
        assert_eq!(value["refreshToken"], "refresh");
        assert_eq!(value["user"]["email"], "alice@example.com");
        assert!(value["user"].get("password").is_none());
    }

    #[test]
    fn public_user_from_record() {
        let record = UserRecord {
            id: Uuid::nil(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: "https://example.com/a.png".to_string(),
            provider: "google".to_string(),
        };
        let user = PublicUser::from(record);
        assert_eq!(user.id, Uuid::nil().to_string());
        assert_eq!(user.provider, "google");
    }
}
