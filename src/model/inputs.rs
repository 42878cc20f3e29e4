use serde::{Deserialize, Serialize};

/// Body of GitHub `testAndApply`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubApplyInput {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub inherit_auth: bool,
}

/// Body of Bitbucket Cloud `testAndApply`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketCloudApplyInput {
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub code: String,
}

/// Body of Bitbucket Server `testAndApply`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketServerApplyInput {
    #[serde(default)]
    pub oauth_token: String,
    #[serde(default)]
    pub oauth_verifier: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub redirect_url: String,
}

/// Body of provider `login`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserInput {
    pub code: String,
    #[serde(default)]
    pub redirect_url: String,
}

/// Body of Bitbucket Server `requestLogin`; omitted fields fall back to the stored config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketServerRequestLoginInput {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub tls: Option<bool>,
    #[serde(default)]
    pub redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketServerRequestLoginOutput {
    pub login_url: String,
    #[serde(rename = "type")]
    pub output_type: String,
}

impl BitbucketServerRequestLoginOutput {
    pub const TYPE: &'static str = "bitbucketServerRequestLoginOutput";

    pub fn new(login_url: String) -> Self {
        Self {
            login_url,
            output_type: Self::TYPE.to_string(),
        }
    }
}
