//! Mail delivery abstraction.
//!
//! The password-reset flow hands a [`MailMessage`] to a [`MailSender`]. The
//! sender decides how to deliver (HTTP relay, SMTP bridge, etc.) and returns
//! `Ok`/`Err`; callers treat a failed send as non-fatal and fall back to
//! disclosing the link on the operational log.
//!
//! The default sender for local dev is [`LogMailSender`], which logs and
//! returns `Ok(())`. [`RelayMailSender`] posts the message as JSON to a
//! configured relay endpoint.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;
use url::Url;

#[derive(Clone, Debug)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Mail delivery abstraction used by the password-reset flow.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver a message or return an error so the caller can fall back.
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "mail send stub"
        );
        Ok(())
    }
}

/// Sender that posts messages as JSON to an HTTP mail relay.
#[derive(Clone, Debug)]
pub struct RelayMailSender {
    client: reqwest::Client,
    endpoint: Url,
    from: String,
}

impl RelayMailSender {
    /// Build a relay sender for `endpoint`.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be constructed.
    pub fn new(endpoint: &str, from: String) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid mail relay endpoint: {endpoint}"))?;
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build mail relay client")?;

        Ok(Self {
            client,
            endpoint,
            from,
        })
    }
}

#[async_trait]
impl MailSender for RelayMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let payload = json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.text,
            "html": message.html,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .context("Failed to reach mail relay")?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("Mail relay rejected message: {}", response.status()))
        }
    }
}
