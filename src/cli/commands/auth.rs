use clap::{builder::ValueParser, Arg, Command};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";

/// Token TTL must be a positive number of seconds.
#[must_use]
pub fn validator_ttl() -> ValueParser {
    ValueParser::from(move |ttl: &str| -> std::result::Result<i64, String> {
        match ttl.parse::<i64>() {
            Ok(seconds) if seconds > 0 => Ok(seconds),
            _ => Err("token TTL must be a positive number of seconds".to_string()),
        }
    })
}

/// Signing secret must not be empty.
#[must_use]
pub fn validator_secret() -> ValueParser {
    ValueParser::from(move |secret: &str| -> std::result::Result<String, String> {
        if secret.is_empty() {
            Err("JWT secret can't be empty".to_string())
        } else {
            Ok(secret.to_string())
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long("jwt-secret")
                .help("Secret used to sign and verify HS256 bearer tokens")
                .env("TODO_APP_JWT_SECRET")
                .hide_env_values(true)
                .required(true)
                .value_parser(validator_secret()),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long("token-ttl-seconds")
                .help("Bearer token TTL in seconds")
                .env("TODO_APP_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(validator_ttl()),
        )
}
