use super::meta::{ObjectMeta, SourceCodeType};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// GitHub settings for one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubPipelineConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_secret: Option<String>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default = "default_true")]
    pub tls: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Delegate client credentials to the cluster-wide GitHub auth config
    #[serde(default)]
    pub inherit: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub redirect_url: String,
}

/// Bitbucket Cloud settings for one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketCloudPipelineConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_secret: Option<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub redirect_url: String,
}

/// Bitbucket Server settings for one project (OAuth1 with an RSA key pair)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketServerPipelineConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_secret: Option<String>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub redirect_url: String,
}

impl BitbucketServerPipelineConfig {
    /// `http(s)://hostname` of the server
    pub fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.hostname.trim_end_matches('/'))
    }
}

/// Provider configuration, one variant per SCM type
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    Github(GithubPipelineConfig),
    BitbucketCloud(BitbucketCloudPipelineConfig),
    BitbucketServer(BitbucketServerPipelineConfig),
}

impl ProviderConfig {
    pub fn source_code_type(&self) -> SourceCodeType {
        match self {
            ProviderConfig::Github(_) => SourceCodeType::Github,
            ProviderConfig::BitbucketCloud(_) => SourceCodeType::BitbucketCloud,
            ProviderConfig::BitbucketServer(_) => SourceCodeType::BitbucketServer,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ProviderConfig::Github(c) => &c.metadata,
            ProviderConfig::BitbucketCloud(c) => &c.metadata,
            ProviderConfig::BitbucketServer(c) => &c.metadata,
        }
    }

    pub fn project_name(&self) -> &str {
        match self {
            ProviderConfig::Github(c) => &c.project_name,
            ProviderConfig::BitbucketCloud(c) => &c.project_name,
            ProviderConfig::BitbucketServer(c) => &c.project_name,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            ProviderConfig::Github(c) => c.enabled,
            ProviderConfig::BitbucketCloud(c) => c.enabled,
            ProviderConfig::BitbucketServer(c) => c.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            ProviderConfig::Github(c) => c.enabled = enabled,
            ProviderConfig::BitbucketCloud(c) => c.enabled = enabled,
            ProviderConfig::BitbucketServer(c) => c.enabled = enabled,
        }
    }
}

/// Provider-type resource exposed to API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthProvider {
    pub metadata: ObjectMeta,
    pub project_name: String,
    #[serde(rename = "type")]
    pub source_code_type: SourceCodeType,
    #[serde(default)]
    pub redirect_url: String,
}

/// Cluster-scoped GitHub authentication config that projects may inherit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalGithubAuthConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub hostname: String,
    #[serde(default = "default_true")]
    pub tls: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}
