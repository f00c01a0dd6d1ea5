//! Google identity-token verification.
//!
//! Verification is delegated to the identity provider's tokeninfo endpoint:
//! the raw ID token is sent over, the provider answers 200 with the decoded
//! claims when the signature and expiry check out, and non-200 otherwise.
//! The only check done locally is that the token was minted for our OAuth
//! client (`aud`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::error;
use url::Url;

/// Claims extracted from a verified identity token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity token rejected")]
    Rejected,
    #[error("identity token audience mismatch")]
    Audience,
    #[error("identity service unreachable: {0}")]
    Transport(String),
}

/// Identity-token verification abstraction for federated login.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a raw ID token and return its claims.
    async fn verify(&self, id_token: &str) -> Result<IdentityClaims, IdentityError>;
}

/// Verifier backed by Google's tokeninfo endpoint.
#[derive(Clone, Debug)]
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    tokeninfo_url: Url,
    client_id: String,
}

impl GoogleTokenVerifier {
    /// Build a verifier for the given OAuth client id.
    ///
    /// # Errors
    /// Returns an error if the tokeninfo URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(client_id: String, tokeninfo_url: &str) -> Result<Self> {
        let tokeninfo_url = Url::parse(tokeninfo_url)
            .with_context(|| format!("Invalid tokeninfo URL: {tokeninfo_url}"))?;
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build tokeninfo client")?;

        Ok(Self {
            client,
            tokeninfo_url,
            client_id,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<IdentityClaims, IdentityError> {
        let response = self
            .client
            .get(self.tokeninfo_url.clone())
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| {
                error!("Error reaching tokeninfo endpoint: {err}");
                IdentityError::Transport(err.to_string())
            })?;

        if !response.status().is_success() {
            error!("Identity token rejected: {}", response.status());
            return Err(IdentityError::Rejected);
        }

        let claims: IdentityClaims = response.json().await.map_err(|err| {
            error!("Error decoding tokeninfo response: {err}");
            IdentityError::Transport(err.to_string())
        })?;

        // tokeninfo validates signature and expiry; the audience is on us.
        if claims.aud.as_deref() != Some(self.client_id.as_str()) {
            return Err(IdentityError::Audience);
        }

        Ok(claims)
    }
}
