//! Shared auth state and configuration.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use crate::api::{google::IdentityVerifier, mail::MailSender};

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 15 * 60;

#[derive(Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    access_token_secret: SecretString,
    refresh_token_secret: SecretString,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(
        frontend_base_url: String,
        access_token_secret: SecretString,
        refresh_token_secret: SecretString,
    ) -> Self {
        Self {
            frontend_base_url,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            reset_token_ttl_seconds: DEFAULT_RESET_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn access_token_secret(&self) -> &str {
        self.access_token_secret.expose_secret()
    }

    #[must_use]
    pub fn refresh_token_secret(&self) -> &str {
        self.refresh_token_secret.expose_secret()
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn reset_token_ttl_seconds(&self) -> i64 {
        self.reset_token_ttl_seconds
    }
}

/// Shared state handed to the auth handlers: configuration plus the
/// injectable mail and identity collaborators.
pub struct AuthState {
    config: AuthConfig,
    mailer: Arc<dyn MailSender>,
    google: Option<Arc<dyn IdentityVerifier>>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        mailer: Arc<dyn MailSender>,
        google: Option<Arc<dyn IdentityVerifier>>,
    ) -> Self {
        Self {
            config,
            mailer,
            google,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn mailer(&self) -> &dyn MailSender {
        self.mailer.as_ref()
    }

    #[must_use]
    pub fn google(&self) -> Option<&dyn IdentityVerifier> {
        self.google.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mail::LogMailSender;

    fn config() -> AuthConfig {
        AuthConfig::new(
            "http://localhost:5173".to_string(),
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        )
    }

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = config();

        assert_eq!(config.frontend_base_url(), "http://localhost:5173");
        assert_eq!(config.access_token_secret(), "access-secret");
        assert_eq!(config.refresh_token_secret(), "refresh-secret");
        assert_eq!(
            config.access_token_ttl_seconds(),
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS
        );
        assert_eq!(
            config.refresh_token_ttl_seconds(),
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS
        );
        assert_eq!(
            config.reset_token_ttl_seconds(),
            DEFAULT_RESET_TOKEN_TTL_SECONDS
        );

        let config = config
            .with_access_token_ttl_seconds(60)
            .with_refresh_token_ttl_seconds(120)
            .with_reset_token_ttl_seconds(30);

        assert_eq!(config.access_token_ttl_seconds(), 60);
        assert_eq!(config.refresh_token_ttl_seconds(), 120);
        assert_eq!(config.reset_token_ttl_seconds(), 30);
    }

    #[test]
    fn auth_state_without_google() {
        let state = AuthState::new(config(), Arc::new(LogMailSender), None);
        assert!(state.google().is_none());
        assert_eq!(state.config().access_token_secret(), "access-secret");
    }
}
