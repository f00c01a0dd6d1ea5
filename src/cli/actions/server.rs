use crate::api::{
    self,
    google::GoogleTokenVerifier,
    handlers::auth::AuthConfig,
    mail::{LogMailSender, MailSender, RelayMailSender},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub reset_token_ttl_seconds: i64,
    pub frontend_base_url: String,
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if an optional integration is misconfigured or the server
/// fails to start.
pub async fn handle(args: Args) -> Result<()> {
    let config = AuthConfig::new(
        args.frontend_base_url,
        args.access_token_secret,
        args.refresh_token_secret,
    )
    .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
    .with_refresh_token_ttl_seconds(args.refresh_token_ttl_seconds)
    .with_reset_token_ttl_seconds(args.reset_token_ttl_seconds);

    let mailer: Arc<dyn MailSender> = match args.mail_relay_url {
        Some(relay_url) => {
            info!("Mail relay configured: {relay_url}");
            Arc::new(
                RelayMailSender::new(&relay_url, args.mail_from)
                    .context("Invalid mail relay URL")?,
            )
        }
        None => {
            info!("Mail relay not configured, reset links are disclosed on the log");
            Arc::new(LogMailSender)
        }
    };

    let google = match args.google_client_id {
        Some(client_id) => {
            info!("Google federated login enabled");
            Some(Arc::new(
                GoogleTokenVerifier::new(client_id, &args.google_tokeninfo_url)
                    .context("Invalid Google tokeninfo URL")?,
            ) as Arc<dyn api::google::IdentityVerifier>)
        }
        None => {
            info!("Google client id not configured, federated login disabled");
            None
        }
    };

    api::new(args.port, args.dsn, config, mailer, google).await?;

    Ok(())
}
