use super::http::handle_response;
use super::RemoteProviderClient;
use crate::config::Settings;
use crate::errors::{Result, ScmError};
use crate::model::{
    BitbucketCloudPipelineConfig, RepoPerm, SourceCodeCredential, SourceCodeRepository,
    SourceCodeType,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// bitbucket.org OAuth consumer client
pub struct BitbucketCloudClient {
    http: Client,
    web_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct UserLinks {
    #[serde(default)]
    avatar: Option<Link>,
    #[serde(default)]
    html: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct BitbucketUser {
    username: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    links: UserLinks,
}

#[derive(Debug, Deserialize)]
struct PermissionPage {
    #[serde(default)]
    values: Vec<RepositoryPermission>,
}

#[derive(Debug, Deserialize)]
struct RepositoryPermission {
    permission: String,
    repository: RepositorySummary,
}

#[derive(Debug, Deserialize)]
struct RepositorySummary {
    full_name: String,
}

impl BitbucketCloudClient {
    pub fn new(config: &BitbucketCloudPipelineConfig, settings: &Settings, http: Client) -> Self {
        Self {
            http,
            web_url: settings.bitbucket_cloud.web_url.trim_end_matches('/').to_string(),
            api_url: settings.bitbucket_cloud.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let url = format!("{}/site/oauth2/access_token", self.web_url);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "authorization_code"), ("code", code)])
            .send()
            .await?;
        let token: TokenResponse = handle_response(response).await?;
        if token.access_token.is_empty() {
            return Err(ScmError::remote(
                "Bitbucket token exchange returned no access token",
            ));
        }
        Ok(token)
    }

    async fn get_user(&self, access_token: &str) -> Result<BitbucketUser> {
        let url = format!("{}/user", self.api_url);
        debug!("GET {}", url);
        let response = self.http.get(&url).bearer_auth(access_token).send().await?;
        handle_response(response).await
    }
}

/// RFC 3339 instant `seconds` from now; `None` when out of range
fn expiry_after(seconds: i64) -> Option<String> {
    let expiry = Duration::try_seconds(seconds).and_then(|d| Utc::now().checked_add_signed(d));
    if expiry.is_none() {
        warn!("Ignoring out-of-range token lifetime of {}s", seconds);
    }
    expiry.map(|at| at.to_rfc3339())
}

fn to_permissions(permission: &str) -> RepoPerm {
    let admin = permission == "admin";
    RepoPerm {
        admin,
        push: admin || permission == "write",
        pull: true,
    }
}

#[async_trait]
impl RemoteProviderClient for BitbucketCloudClient {
    fn source_code_type(&self) -> SourceCodeType {
        SourceCodeType::BitbucketCloud
    }

    async fn login(&self, code: &str) -> Result<SourceCodeCredential> {
        let token = self.exchange_code(code).await?;
        let user = self.get_user(&token.access_token).await?;
        info!("Authenticated Bitbucket Cloud user {}", user.username);

        let mut credential =
            SourceCodeCredential::new(SourceCodeType::BitbucketCloud, &user.username);
        credential.spec.display_name = if user.display_name.is_empty() {
            user.username.clone()
        } else {
            user.display_name
        };
        credential.spec.avatar_url = user.links.avatar.map(|l| l.href).unwrap_or_default();
        credential.spec.html_url = user.links.html.map(|l| l.href).unwrap_or_default();
        credential.spec.git_login_name = user.username;
        credential.spec.access_token = token.access_token;
        credential.spec.refresh_token = token.refresh_token;
        if let Some(seconds) = token.expires_in {
            credential.spec.expiry = expiry_after(seconds).unwrap_or_default();
        }
        Ok(credential)
    }

    async fn list_repositories(
        &self,
        credential: &SourceCodeCredential,
    ) -> Result<Vec<SourceCodeRepository>> {
        let url = format!("{}/user/permissions/repositories?pagelen=100", self.api_url);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&credential.spec.access_token)
            .send()
            .await?;
        let page: PermissionPage = handle_response(response).await?;

        Ok(page
            .values
            .into_iter()
            .map(|entry| {
                let clone_url = format!("{}/{}.git", self.web_url, entry.repository.full_name);
                SourceCodeRepository::new(
                    SourceCodeType::BitbucketCloud,
                    &clone_url,
                    to_permissions(&entry.permission),
                )
            })
            .collect())
    }
}
