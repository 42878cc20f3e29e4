use super::http::{handle_response, handle_text};
use super::RemoteProviderClient;
use crate::config::Settings;
use crate::errors::{Result, ScmError};
use crate::model::{
    BitbucketServerPipelineConfig, RepoPerm, SourceCodeCredential, SourceCodeRepository,
    SourceCodeType,
};
use crate::oauth1::{OAuth1Consumer, RequestToken};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use tracing::{debug, info};

/// Bitbucket Server client authenticated through an OAuth1 application link
pub struct BitbucketServerClient {
    consumer: OAuth1Consumer,
    base_url: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct UserLinks {
    #[serde(rename = "self", default)]
    self_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerUser {
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    links: UserLinks,
}

#[derive(Debug, Deserialize)]
struct RepoPage {
    #[serde(default)]
    values: Vec<ServerRepo>,
}

#[derive(Debug, Deserialize)]
struct ServerRepo {
    #[serde(default)]
    links: RepoLinks,
}

#[derive(Debug, Default, Deserialize)]
struct RepoLinks {
    #[serde(default)]
    clone: Vec<Link>,
}

/// Pieces of the composite login code `project:oauthToken[:oauthVerifier]`.
///
/// The project part is the bare project name, never `cluster:project`: the
/// code is split from the left, so a cluster prefix would shift every field.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginCode<'a> {
    pub project_id: &'a str,
    pub oauth_token: &'a str,
    pub oauth_verifier: &'a str,
}

impl<'a> LoginCode<'a> {
    pub fn parse(code: &'a str) -> Result<Self> {
        let mut parts = code.splitn(3, ':');
        let project_id = parts.next().unwrap_or_default();
        let oauth_token = parts.next().unwrap_or_default();
        let oauth_verifier = parts.next().unwrap_or_default();
        if oauth_token.is_empty() {
            return Err(ScmError::invalid_body(
                "Bitbucket Server code must be projectID:oauthToken[:oauthVerifier]",
            ));
        }
        Ok(Self {
            project_id,
            oauth_token,
            oauth_verifier,
        })
    }
}

impl BitbucketServerClient {
    /// Fails with a decode error if the stored private key is not valid PEM
    pub fn new(
        config: &BitbucketServerPipelineConfig,
        settings: &Settings,
        http: Client,
    ) -> Result<Self> {
        let base_url = config.base_url();
        let consumer =
            OAuth1Consumer::from_pem(&config.consumer_key, &config.private_key, &base_url, http)?;
        Ok(Self {
            consumer,
            base_url,
            page_size: settings.bitbucket_server.page_size,
        })
    }

    async fn get_text(&self, url: &str, access_token: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .consumer
            .signed_request(Method::GET, url, access_token)?
            .send()
            .await?;
        handle_text(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<ServerUser> {
        let whoami = format!("{}/plugins/servlet/applinks/whoami", self.base_url);
        let username = self.get_text(&whoami, access_token).await?;
        let username = username.trim();
        if username.is_empty() {
            return Err(ScmError::remote("Bitbucket Server did not report a user"));
        }

        let url = format!(
            "{}/rest/api/1.0/users/{}",
            self.base_url,
            urlencoding::encode(username)
        );
        let body = self.get_text(&url, access_token).await?;
        serde_json::from_str(&body)
            .map_err(|e| ScmError::remote(format!("Failed to parse JSON response: {}", e)))
    }
}

#[async_trait]
impl RemoteProviderClient for BitbucketServerClient {
    fn source_code_type(&self) -> SourceCodeType {
        SourceCodeType::BitbucketServer
    }

    async fn login(&self, code: &str) -> Result<SourceCodeCredential> {
        let code = LoginCode::parse(code)?;
        debug!("Bitbucket Server login for project {}", code.project_id);

        let request_token = RequestToken {
            token: code.oauth_token.to_string(),
            secret: String::new(),
        };
        let access = self
            .consumer
            .authorize_token(&request_token, code.oauth_verifier)
            .await?;
        let user = self.get_user(&access.token).await?;
        info!("Authenticated Bitbucket Server user {}", user.name);

        let html_url = user
            .links
            .self_links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        let mut credential = SourceCodeCredential::new(SourceCodeType::BitbucketServer, &user.name);
        credential.spec.display_name = user.display_name;
        credential.spec.avatar_url = if html_url.is_empty() {
            String::new()
        } else {
            format!("{html_url}/avatar.png")
        };
        credential.spec.html_url = html_url;
        credential.spec.git_login_name = user.name;
        credential.spec.access_token = access.token;
        Ok(credential)
    }

    async fn list_repositories(
        &self,
        credential: &SourceCodeCredential,
    ) -> Result<Vec<SourceCodeRepository>> {
        // the server filters to REPO_ADMIN, so everything returned is admin
        let url = format!(
            "{}/rest/api/1.0/repos?permission=REPO_ADMIN&limit={}",
            self.base_url, self.page_size
        );
        debug!("GET {}", url);
        let response = self
            .consumer
            .signed_request(Method::GET, &url, &credential.spec.access_token)?
            .send()
            .await?;
        let page: RepoPage = handle_response(response).await?;

        let all = RepoPerm {
            pull: true,
            push: true,
            admin: true,
        };
        Ok(page
            .values
            .into_iter()
            .filter_map(|repo| {
                repo.links
                    .clone
                    .into_iter()
                    .find(|link| link.name.starts_with("http"))
                    .map(|link| {
                        SourceCodeRepository::new(SourceCodeType::BitbucketServer, &link.href, all)
                    })
            })
            .collect())
    }
}
