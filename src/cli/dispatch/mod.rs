use crate::cli::{
    actions::{server::Args, Action},
    commands::auth::{ARG_JWT_SECRET, ARG_TOKEN_TTL_SECONDS},
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let jwt_secret = matches
        .get_one::<String>(ARG_JWT_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --jwt-secret")?;
    let token_ttl_seconds = matches
        .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
        .copied()
        .unwrap_or(crate::api::auth::token::DEFAULT_TTL_SECONDS);

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret,
        token_ttl_seconds,
    }))
}
