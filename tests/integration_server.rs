//! End-to-end tests against a live PostgreSQL database.
//!
//! These tests spin the real router on an ephemeral port and drive it through
//! the API client. They need a database: set `AUTHFLOW_TEST_DSN` to a
//! PostgreSQL DSN to run them; without it the suite is a no-op so regular
//! `cargo test` stays self-contained.

use authflow::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState},
        mail::LogMailSender,
    },
    client::{ApiClient, ClientError},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

async fn spawn_server() -> Option<String> {
    let Ok(dsn) = std::env::var("AUTHFLOW_TEST_DSN") else {
        eprintln!("AUTHFLOW_TEST_DSN not set, skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&dsn)
        .await
        .expect("connect to test database");

    sqlx::migrate!().run(&pool).await.expect("run migrations");

    let config = AuthConfig::new(
        "http://localhost:5173".to_string(),
        SecretString::from("integration-access-secret".to_string()),
        SecretString::from("integration-refresh-secret".to_string()),
    );
    let state = Arc::new(AuthState::new(config, Arc::new(LogMailSender), None));

    let app = api::app(pool, state).expect("build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind server");
    let addr = listener.local_addr().expect("server addr");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("serve");
    });

    Some(format!("http://{addr}"))
}

#[tokio::test]
async fn register_login_profile_logout_flow() {
    let Some(base_url) = spawn_server().await else {
        return;
    };

    let email = format!("it-{}@example.com", Uuid::new_v4().simple());
    let client = ApiClient::new(&base_url).expect("build client");

    // Register and verify the public fields.
    let registered = client
        .register("Test User", &email, "Secret123")
        .await
        .expect("register");
    assert!(registered.success);
    assert_eq!(registered.user.email, email);
    assert_eq!(registered.user.provider, "local");

    // Registering the same email twice conflicts.
    let duplicate = client.register("Test User", &email, "Secret123").await;
    match duplicate {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Email already in use");
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    // Wrong password gets the generic message.
    let rejected = client.login(&email, "WrongPassword1").await;
    match rejected {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected unauthorized, got {other:?}"),
    }

    // A fresh login rotates the stored refresh token: the one issued at
    // registration stops satisfying refresh.
    let old_refresh = registered.refresh_token.clone();
    let logged_in = client.login(&email, "Secret123").await.expect("login");
    assert!(logged_in.success);

    let raw = reqwest::Client::new();
    let stale = raw
        .post(format!("{base_url}/api/auth/refresh-token"))
        .json(&serde_json::json!({ "refreshToken": old_refresh }))
        .send()
        .await
        .expect("refresh call");
    assert_eq!(stale.status(), 401);

    // Protected profile round trip.
    let me = client.me().await.expect("profile");
    assert_eq!(me.user.name, "Test User");

    let updated = client
        .update_me("New", "http://example.com/avatar.png")
        .await
        .expect("update profile");
    assert_eq!(updated.user.name, "New");
    assert_eq!(updated.user.avatar, "http://example.com/avatar.png");

    // Logout invalidates the current refresh token.
    let refresh_token = client.tokens().await.expect("session").refresh_token;
    client.logout().await.expect("logout");
    assert!(client.tokens().await.is_none());

    let revoked = raw
        .post(format!("{base_url}/api/auth/refresh-token"))
        .json(&serde_json::json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("refresh call");
    assert_eq!(revoked.status(), 401);
}

#[tokio::test]
async fn forgot_password_is_uniform_and_reset_rejects_bad_tokens() {
    let Some(base_url) = spawn_server().await else {
        return;
    };

    let client = ApiClient::new(&base_url).expect("build client");

    let email = format!("it-{}@example.com", Uuid::new_v4().simple());
    client
        .register("Reset User", &email, "Secret123")
        .await
        .expect("register");

    // Existing and unknown emails answer identically.
    let known = client.forgot_password(&email).await.expect("forgot known");
    let unknown = client
        .forgot_password("nobody@example.com")
        .await
        .expect("forgot unknown");
    assert_eq!(known.message, unknown.message);
    assert!(known.success && unknown.success);

    // A token that was never issued is rejected.
    let bogus = client
        .reset_password(&"0".repeat(64), "NewSecret123")
        .await;
    match bogus {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid or expired token");
        }
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn federated_login_disabled_answers_not_implemented() {
    let Some(base_url) = spawn_server().await else {
        return;
    };

    let raw = reqwest::Client::new();
    let response = raw
        .post(format!("{base_url}/api/auth/google"))
        .json(&serde_json::json!({ "idToken": "anything" }))
        .send()
        .await
        .expect("google call");
    assert_eq!(response.status(), 501);

    let body: serde_json::Value = response.json().await.expect("envelope");
    assert_eq!(body["success"], serde_json::Value::Bool(false));
    assert_eq!(body["message"], "Google auth not configured on server");
}

#[tokio::test]
async fn unknown_routes_get_the_error_envelope() {
    let Some(base_url) = spawn_server().await else {
        return;
    };

    let raw = reqwest::Client::new();
    let response = raw
        .get(format!("{base_url}/api/no-such-route"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.expect("envelope");
    assert_eq!(body["success"], serde_json::Value::Bool(false));
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["message"], "Route not found");
}
