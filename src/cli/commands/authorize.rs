use crate::cli::output::Output;
use crate::config::Settings;
use crate::errors::{Result, ScmError};
use crate::providers::bitbucket_cloud::bitbucket_cloud_redirect_url;
use crate::providers::github::github_redirect_url;
use clap::ValueEnum;

/// OAuth2 providers with a static authorize URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OAuthProviderArg {
    Github,
    #[value(name = "bitbucketcloud")]
    BitbucketCloud,
}

pub fn authorize_url(
    settings: &Settings,
    provider: OAuthProviderArg,
    client_id: &str,
    hostname: Option<&str>,
    tls: bool,
) -> Result<String> {
    if client_id.trim().is_empty() {
        return Err(ScmError::validation("client ID is required"));
    }
    Ok(match provider {
        OAuthProviderArg::Github => github_redirect_url(
            hostname.unwrap_or_default(),
            tls,
            client_id,
            &settings.github.default_host,
        ),
        OAuthProviderArg::BitbucketCloud => {
            bitbucket_cloud_redirect_url(&settings.bitbucket_cloud.web_url, client_id)
        }
    })
}

/// Print the URL a user visits to authorize the OAuth app
pub async fn run(
    settings: &Settings,
    provider: OAuthProviderArg,
    client_id: &str,
    hostname: Option<&str>,
    tls: bool,
    open_browser: bool,
) -> Result<()> {
    let url = authorize_url(settings, provider, client_id, hostname, tls)?;
    println!("{url}");

    if open_browser {
        if let Err(e) = open::that(&url) {
            Output::warning(format!("Could not open a browser: {e}"));
        }
    }
    Ok(())
}
