use clap::{Arg, Command};

pub const ARG_MAIL_RELAY_URL: &str = "mail-relay-url";
pub const ARG_MAIL_FROM: &str = "mail-from";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAIL_RELAY_URL)
                .long(ARG_MAIL_RELAY_URL)
                .help("HTTP mail relay endpoint; reset links are logged when absent")
                .env("AUTHFLOW_MAIL_RELAY_URL"),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender address for outbound mail")
                .env("AUTHFLOW_MAIL_FROM")
                .default_value("no-reply@authflow.dev"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub relay_url: Option<String>,
    pub from: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            relay_url: matches.get_one::<String>(ARG_MAIL_RELAY_URL).cloned(),
            from: matches
                .get_one::<String>(ARG_MAIL_FROM)
                .cloned()
                .unwrap_or_else(|| "no-reply@authflow.dev".to_string()),
        }
    }
}
