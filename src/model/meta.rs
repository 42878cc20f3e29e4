use crate::errors::{Result, ScmError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Object metadata shared by every stored resource.
///
/// Unknown fields are rejected. `creationTimestamp` in particular has no typed
/// counterpart here and has to be removed from raw documents before decoding
/// (see [`crate::store::unstructured`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    /// `namespace:name`, the identifier used by indexes and log lines
    pub fn key(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

/// Supported source code provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCodeType {
    Github,
    BitbucketCloud,
    BitbucketServer,
}

impl SourceCodeType {
    pub const ALL: [SourceCodeType; 3] = [
        SourceCodeType::Github,
        SourceCodeType::BitbucketCloud,
        SourceCodeType::BitbucketServer,
    ];

    /// Provider type constant, also the fixed name of the provider config resource
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCodeType::Github => "github",
            SourceCodeType::BitbucketCloud => "bitbucketcloud",
            SourceCodeType::BitbucketServer => "bitbucketserver",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceCodeType::Github => "GitHub",
            SourceCodeType::BitbucketCloud => "Bitbucket Cloud",
            SourceCodeType::BitbucketServer => "Bitbucket Server",
        }
    }
}

impl std::fmt::Display for SourceCodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceCodeType {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "github" => Ok(SourceCodeType::Github),
            "bitbucketcloud" => Ok(SourceCodeType::BitbucketCloud),
            "bitbucketserver" => Ok(SourceCodeType::BitbucketServer),
            other => Err(ScmError::validation(format!(
                "unsupported source code type: {other}"
            ))),
        }
    }
}
