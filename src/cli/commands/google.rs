use clap::{Arg, Command};

pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_TOKENINFO_URL: &str = "google-tokeninfo-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("OAuth client id; federated login is disabled when absent")
                .env("AUTHFLOW_GOOGLE_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_GOOGLE_TOKENINFO_URL)
                .long(ARG_GOOGLE_TOKENINFO_URL)
                .help("Identity token verification endpoint")
                .env("AUTHFLOW_GOOGLE_TOKENINFO_URL")
                .default_value("https://oauth2.googleapis.com/tokeninfo"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub client_id: Option<String>,
    pub tokeninfo_url: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            client_id: matches.get_one::<String>(ARG_GOOGLE_CLIENT_ID).cloned(),
            tokeninfo_url: matches
                .get_one::<String>(ARG_GOOGLE_TOKENINFO_URL)
                .cloned()
                .unwrap_or_else(|| "https://oauth2.googleapis.com/tokeninfo".to_string()),
        }
    }
}
