use crate::cli::output::Output;
use crate::config::Settings;
use crate::errors::{Result, ScmError};
use crate::oauth1::OAuth1Consumer;
use crate::remote::http::build_client;
use std::fs;
use std::path::Path;

pub struct RequestLoginArgs<'a> {
    pub hostname: &'a str,
    pub tls: bool,
    pub consumer_key: &'a str,
    pub private_key_file: &'a Path,
    pub redirect_url: &'a str,
}

/// Run the first OAuth1 leg against a Bitbucket Server and print the login URL
pub async fn run(settings: &Settings, args: RequestLoginArgs<'_>) -> Result<()> {
    let private_key = fs::read_to_string(args.private_key_file).map_err(|e| {
        ScmError::config(format!(
            "Failed to read private key {}: {}",
            args.private_key_file.display(),
            e
        ))
    })?;

    let scheme = if args.tls { "https" } else { "http" };
    let host = format!("{}://{}", scheme, args.hostname.trim_end_matches('/'));
    let consumer = OAuth1Consumer::from_pem(
        args.consumer_key,
        &private_key,
        &host,
        build_client(&settings.http)?,
    )?;

    let (token, login_url) = consumer.get_request_token_and_url(args.redirect_url).await?;
    println!("{login_url}");

    Output::section("Request token");
    Output::sub_item(format!("oauth_token: {}", token.token));
    Output::tip("After authorizing, apply with the oauth_token and oauth_verifier from the callback");
    Ok(())
}
