use super::http::handle_response;
use super::RemoteProviderClient;
use crate::config::Settings;
use crate::errors::{Result, ScmError};
use crate::model::{
    GithubPipelineConfig, RepoPerm, SourceCodeCredential, SourceCodeRepository, SourceCodeType,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// GitHub / GitHub Enterprise OAuth app client
pub struct GithubClient {
    http: Client,
    web_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    clone_url: String,
    #[serde(default)]
    permissions: Option<GithubPermissions>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GithubPermissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    pull: bool,
}

impl GithubClient {
    pub fn new(config: &GithubPipelineConfig, settings: &Settings, http: Client) -> Self {
        let (web_url, api_url) = endpoints(config, settings);
        Self {
            http,
            web_url,
            api_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
        }
    }

    pub fn web_url(&self) -> &str {
        &self.web_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let url = format!("{}/login/oauth/access_token", self.web_url);
        debug!("POST {}", url);

        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
        ];
        if !self.redirect_url.is_empty() {
            form.push(("redirect_uri", self.redirect_url.as_str()));
        }

        let response = self.http.post(&url).form(&form).send().await?;
        let token: TokenResponse = handle_response(response).await?;

        // GitHub reports exchange failures with a 200 and an `error` field
        match (token.access_token, token.error) {
            (Some(access_token), None) if !access_token.is_empty() => Ok(access_token),
            (_, error) => Err(ScmError::remote(format!(
                "GitHub token exchange failed: {}",
                token
                    .error_description
                    .or(error)
                    .unwrap_or_else(|| "no access token returned".to_string())
            ))),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<GithubUser> {
        let url = format!("{}/user", self.api_url);
        debug!("GET {}", url);
        let response = self.http.get(&url).bearer_auth(access_token).send().await?;
        handle_response(response).await
    }
}

/// Web and API base URLs. An empty or default hostname means github.com.
fn endpoints(config: &GithubPipelineConfig, settings: &Settings) -> (String, String) {
    let host = config.hostname.trim().trim_end_matches('/');
    if host.is_empty() || host.eq_ignore_ascii_case(&settings.github.default_host) {
        return (
            format!("https://{}", settings.github.default_host),
            format!("https://{}", settings.github.api_host),
        );
    }
    let scheme = if config.tls { "https" } else { "http" };
    (
        format!("{scheme}://{host}"),
        format!("{scheme}://{host}/api/v3"),
    )
}

#[async_trait]
impl RemoteProviderClient for GithubClient {
    fn source_code_type(&self) -> SourceCodeType {
        SourceCodeType::Github
    }

    async fn login(&self, code: &str) -> Result<SourceCodeCredential> {
        let access_token = self.exchange_code(code).await?;
        let user = self.get_user(&access_token).await?;
        info!("Authenticated GitHub user {}", user.login);

        let mut credential = SourceCodeCredential::new(SourceCodeType::Github, &user.login);
        credential.spec.display_name = user
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.login.clone());
        credential.spec.avatar_url = user.avatar_url;
        credential.spec.html_url = user.html_url;
        credential.spec.git_login_name = user.login;
        credential.spec.access_token = access_token;
        Ok(credential)
    }

    async fn list_repositories(
        &self,
        credential: &SourceCodeCredential,
    ) -> Result<Vec<SourceCodeRepository>> {
        let url = format!("{}/user/repos?per_page=100", self.api_url);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&credential.spec.access_token)
            .send()
            .await?;
        let repos: Vec<GithubRepo> = handle_response(response).await?;

        Ok(repos
            .into_iter()
            .map(|repo| {
                let perms = repo.permissions.unwrap_or_default();
                let mut repository = SourceCodeRepository::new(
                    SourceCodeType::Github,
                    &repo.clone_url,
                    RepoPerm {
                        pull: perms.pull,
                        push: perms.push,
                        admin: perms.admin,
                    },
                );
                repository.spec.language = repo.language.unwrap_or_default();
                repository.spec.default_branch = repo.default_branch.unwrap_or_default();
                repository
            })
            .collect())
    }
}
