use crate::errors::{Result, ScmError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub github: GithubSettings,
    pub bitbucket_cloud: BitbucketCloudSettings,
    pub bitbucket_server: BitbucketServerSettings,
}

/// Transport settings shared by every remote client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    /// Host used when a config leaves `hostname` empty
    pub default_host: String,
    /// API host paired with `default_host`; Enterprise hosts use `/api/v3` instead
    pub api_host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitbucketCloudSettings {
    pub web_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitbucketServerSettings {
    /// `limit` sent with the single repository listing request
    pub page_size: u32,
    /// RSA modulus size used by `generateKeys`
    pub key_bits: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("scm-provider-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            default_host: "github.com".to_string(),
            api_host: "api.github.com".to_string(),
        }
    }
}

impl Default for BitbucketCloudSettings {
    fn default() -> Self {
        Self {
            web_url: "https://bitbucket.org".to_string(),
            api_url: "https://api.bitbucket.org/2.0".to_string(),
        }
    }
}

impl Default for BitbucketServerSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            key_bits: 2048,
        }
    }
}

impl Settings {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(ScmError::config("HTTP timeout must be greater than zero"));
        }

        if self.bitbucket_server.page_size == 0 {
            return Err(ScmError::config(
                "Bitbucket Server page size must be greater than zero",
            ));
        }

        if self.bitbucket_server.key_bits < 1024 {
            return Err(ScmError::config(format!(
                "RSA key size must be at least 1024 bits, got {}",
                self.bitbucket_server.key_bits
            )));
        }

        for (key, url) in [
            ("bitbucket_cloud.web_url", &self.bitbucket_cloud.web_url),
            ("bitbucket_cloud.api_url", &self.bitbucket_cloud.api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ScmError::config(format!(
                    "{key} must start with http:// or https://"
                )));
            }
        }

        if self.github.default_host.contains("://") || self.github.api_host.contains("://") {
            return Err(ScmError::config(
                "GitHub hosts are bare host names without a scheme",
            ));
        }

        Ok(())
    }
}
