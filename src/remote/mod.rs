//! Remote SCM clients.
//!
//! Every provider exposes the same two capabilities: exchange an
//! authorization artifact for a credential, and list the repositories a
//! credential can see. [`HttpRemoteFactory`] builds the real HTTP clients;
//! tests substitute their own [`RemoteClientFactory`].

pub mod bitbucket_cloud;
pub mod bitbucket_server;
pub mod github;
pub mod http;

pub use bitbucket_cloud::BitbucketCloudClient;
pub use bitbucket_server::BitbucketServerClient;
pub use github::GithubClient;

use crate::config::Settings;
use crate::errors::Result;
use crate::model::{ProviderConfig, SourceCodeCredential, SourceCodeRepository, SourceCodeType};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait RemoteProviderClient: Send + Sync {
    fn source_code_type(&self) -> SourceCodeType;

    /// Exchange `code` for a credential describing the remote account.
    /// The returned credential has no namespace or name yet.
    async fn login(&self, code: &str) -> Result<SourceCodeCredential>;

    /// Repositories visible to `credential`, admin or not
    async fn list_repositories(
        &self,
        credential: &SourceCodeCredential,
    ) -> Result<Vec<SourceCodeRepository>>;
}

pub trait RemoteClientFactory: Send + Sync {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RemoteProviderClient>>;
}

/// Builds HTTP clients from stored provider configs
pub struct HttpRemoteFactory {
    settings: Settings,
    http: Client,
}

impl HttpRemoteFactory {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = http::build_client(&settings.http)?;
        Ok(Self { settings, http })
    }
}

impl RemoteClientFactory for HttpRemoteFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RemoteProviderClient>> {
        let client: Box<dyn RemoteProviderClient> = match config {
            ProviderConfig::Github(c) => {
                Box::new(GithubClient::new(c, &self.settings, self.http.clone()))
            }
            ProviderConfig::BitbucketCloud(c) => {
                Box::new(BitbucketCloudClient::new(c, &self.settings, self.http.clone()))
            }
            ProviderConfig::BitbucketServer(c) => Box::new(BitbucketServerClient::new(
                c,
                &self.settings,
                self.http.clone(),
            )?),
        };
        Ok(client)
    }
}
