//! API client with transparent access-token refresh.
//!
//! [`ApiClient`] attaches the access token as a bearer credential to every
//! request. On a 401 it attempts exactly one silent recovery: exchange the
//! refresh token for a new access token, then retry the original request.
//! Concurrent 401s are collapsed into a single network refresh — waiters park
//! on the refresh gate and share the outcome, so N failing requests produce
//! exactly one call to the refresh endpoint and then all retry with the new
//! token (or all fail together).
//!
//! A 401 from the refresh endpoint itself is terminal: the stored pair is
//! cleared and [`ClientError::SessionExpired`] tells the caller to go back
//! through login.

pub mod store;

pub use store::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::api::handlers::auth::types::{
    AuthResponse, MessageResponse, UpdatedUserResponse, UserResponse,
};

const REFRESH_PATH: &str = "/api/auth/refresh-token";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session expired, sign in again")]
    SessionExpired,
    #[error("token refresh failed")]
    RefreshFailed,
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Outcome of a completed refresh attempt, shared with queued waiters.
#[derive(Clone, Copy, Debug)]
enum RefreshFailure {
    SessionExpired,
    Unavailable,
}

impl From<RefreshFailure> for ClientError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::SessionExpired => ClientError::SessionExpired,
            RefreshFailure::Unavailable => ClientError::RefreshFailed,
        }
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    tokens: RwLock<Option<TokenPair>>,
    /// Completed refresh attempts; read before parking on the gate so waiters
    /// can tell whether a refresh finished while they were queued.
    attempts: AtomicU64,
    /// Single-flight gate. Holds the outcome of the last completed attempt.
    refresh_gate: Mutex<Option<RefreshFailure>>,
}

impl ApiClient {
    /// Client with an in-memory session.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_store(base_url, Arc::new(MemoryTokenStore::new()))
    }

    /// Client with a caller-provided token store; any persisted session is
    /// picked up on construction.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_store(
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .map_err(|err| ClientError::Config(err.to_string()))?;

        let tokens = match store.load() {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!("Failed to load persisted session: {err:#}");
                None
            }
        };

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            tokens: RwLock::new(tokens),
            attempts: AtomicU64::new(0),
            refresh_gate: Mutex::new(None),
        })
    }

    /// Current token pair, if a session is live.
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Endpoint methods
    // ------------------------------------------------------------------

    /// Register a new account and adopt the returned session.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] with the server's envelope on rejection.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = json!({ "name": name, "email": email, "password": password });
        let response: AuthResponse = self
            .request_json(Method::POST, "/api/auth/register", Some(&body))
            .await?;
        self.adopt_session(&response).await;
        Ok(response)
    }

    /// Log in with email and password and adopt the returned session.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] with the server's envelope on rejection.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = json!({ "email": email, "password": password });
        let response: AuthResponse = self
            .request_json(Method::POST, "/api/auth/login", Some(&body))
            .await?;
        self.adopt_session(&response).await;
        Ok(response)
    }

    /// Log in with a Google ID token and adopt the returned session.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] with the server's envelope on rejection.
    pub async fn google_login(&self, id_token: &str) -> Result<AuthResponse, ClientError> {
        let body = json!({ "idToken": id_token });
        let response: AuthResponse = self
            .request_json(Method::POST, "/api/auth/google", Some(&body))
            .await?;
        self.adopt_session(&response).await;
        Ok(response)
    }

    /// Invalidate the server-side refresh slot and drop the local session.
    /// A client without a session is already logged out.
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] when the server cannot be reached.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Some(tokens) = self.tokens().await else {
            return Ok(());
        };

        let body = json!({ "refreshToken": tokens.refresh_token });
        let result: Result<MessageResponse, ClientError> = self
            .request_json(Method::POST, "/api/auth/logout", Some(&body))
            .await;

        // Local state goes regardless of what the server said.
        self.clear_session().await;

        match result {
            Ok(_) | Err(ClientError::Api { .. } | ClientError::SessionExpired) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Request a password-reset email. Always succeeds for well-formed input,
    /// whether or not the account exists.
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] when the server cannot be reached.
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ClientError> {
        let body = json!({ "email": email });
        self.request_json(Method::POST, "/api/auth/forgot-password", Some(&body))
            .await
    }

    /// Redeem an emailed reset token for a new password.
    ///
    /// # Errors
    /// Returns [`ClientError::Api`] when the token is invalid or expired.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<MessageResponse, ClientError> {
        let body = json!({ "token": token, "password": password });
        self.request_json(Method::POST, "/api/auth/reset-password", Some(&body))
            .await
    }

    /// Fetch the authenticated profile.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionExpired`] when the session cannot be
    /// recovered.
    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        self.request_json::<serde_json::Value, _>(Method::GET, "/api/user/me", None)
            .await
    }

    /// Update the authenticated profile. Both fields are required.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionExpired`] when the session cannot be
    /// recovered.
    pub async fn update_me(
        &self,
        name: &str,
        avatar: &str,
    ) -> Result<UpdatedUserResponse, ClientError> {
        let body = json!({ "name": name, "avatar": avatar });
        self.request_json(Method::PUT, "/api/user/me", Some(&body))
            .await
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    async fn request_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        // Observed before dispatch: a 401 only warrants a refresh when no
        // refresh has completed since this request left with its token.
        let observed = self.attempts.load(Ordering::Acquire);
        let response = self.dispatch(method.clone(), path, body).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::parse(response).await;
        }

        // One silent recovery per failing request, and only when there is a
        // session to recover; an anonymous 401 just surfaces.
        if self.refresh_token().await.is_none() {
            return Self::parse(response).await;
        }

        self.refresh_access_token(observed).await?;

        let retry = self.dispatch(method, path, body).await?;
        Self::parse(retry).await
    }

    async fn dispatch<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, url);

        if let Some(tokens) = self.tokens().await {
            request = request.bearer_auth(tokens.access_token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| ClientError::Decode(err.to_string()));
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|value| value["message"].as_str().map(ToString::to_string))
            .unwrap_or_else(|| "Request failed.".to_string());

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // ------------------------------------------------------------------
    // Refresh (single flight)
    // ------------------------------------------------------------------

    async fn refresh_access_token(&self, observed: u64) -> Result<(), ClientError> {
        let mut last_outcome = self.refresh_gate.lock().await;

        if self.attempts.load(Ordering::Acquire) != observed {
            // A refresh completed while we were queued; share its outcome
            // instead of firing another one.
            debug!("refresh already performed by a concurrent request");
            return match *last_outcome {
                None => Ok(()),
                Some(failure) => Err(failure.into()),
            };
        }

        let Some(refresh_token) = self.refresh_token().await else {
            return Err(ClientError::SessionExpired);
        };

        let result = self.call_refresh_endpoint(&refresh_token).await;
        self.attempts.fetch_add(1, Ordering::Release);

        match result {
            Ok(access_token) => {
                self.replace_access_token(access_token).await;
                *last_outcome = None;
                Ok(())
            }
            Err(failure) => {
                if matches!(failure, RefreshFailure::SessionExpired) {
                    self.clear_session().await;
                }
                *last_outcome = Some(failure);
                Err(failure.into())
            }
        }
    }

    async fn call_refresh_endpoint(&self, refresh_token: &str) -> Result<String, RefreshFailure> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let body = json!({ "refreshToken": refresh_token });

        // Raw post, no bearer header: the refresh endpoint authenticates by
        // the refresh token alone, and must not recurse into this client.
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!("Refresh call failed: {err}");
                RefreshFailure::Unavailable
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("refresh token rejected, session is over");
            return Err(RefreshFailure::SessionExpired);
        }
        if !response.status().is_success() {
            warn!("Refresh call rejected: {}", response.status());
            return Err(RefreshFailure::Unavailable);
        }

        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Refresh {
            access_token: String,
        }

        response
            .json::<Refresh>()
            .await
            .map(|refresh| refresh.access_token)
            .map_err(|err| {
                warn!("Refresh response malformed: {err}");
                RefreshFailure::Unavailable
            })
    }

    // ------------------------------------------------------------------
    // Session state
    // ------------------------------------------------------------------

    async fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|tokens| tokens.refresh_token.clone())
    }

    async fn adopt_session(&self, response: &AuthResponse) {
        let pair = TokenPair {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
        };
        if let Err(err) = self.store.save(&pair) {
            warn!("Failed to persist session: {err:#}");
        }
        *self.tokens.write().await = Some(pair);
    }

    async fn replace_access_token(&self, access_token: String) {
        let mut tokens = self.tokens.write().await;
        if let Some(pair) = tokens.as_mut() {
            pair.access_token = access_token;
            if let Err(err) = self.store.save(pair) {
                warn!("Failed to persist session: {err:#}");
            }
        }
    }

    async fn clear_session(&self) {
        if let Err(err) = self.store.clear() {
            warn!("Failed to clear persisted session: {err:#}");
        }
        *self.tokens.write().await = None;
    }
}
