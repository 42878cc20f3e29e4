use super::meta::{ObjectMeta, SourceCodeType};
use serde::{Deserialize, Serialize};

/// A user's authenticated link to a remote SCM account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCodeCredential {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: SourceCodeCredentialSpec,
    #[serde(default)]
    pub status: SourceCodeCredentialStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCodeCredentialSpec {
    #[serde(default)]
    pub project_name: String,
    pub source_code_type: SourceCodeType,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html_url: String,
    #[serde(default)]
    pub login_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_login_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_clone_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expiry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCodeCredentialStatus {
    #[serde(default)]
    pub logout: bool,
}

impl SourceCodeCredential {
    pub fn new(source_code_type: SourceCodeType, login_name: &str) -> Self {
        Self {
            metadata: ObjectMeta::default(),
            spec: SourceCodeCredentialSpec {
                project_name: String::new(),
                source_code_type,
                user_name: String::new(),
                display_name: String::new(),
                avatar_url: String::new(),
                html_url: String::new(),
                login_name: login_name.to_string(),
                git_login_name: String::new(),
                git_clone_token: String::new(),
                access_token: String::new(),
                refresh_token: String::new(),
                expiry: String::new(),
            },
            status: SourceCodeCredentialStatus::default(),
        }
    }

    /// Representation returned to API callers; write-only token fields are dropped
    pub fn public_view(&self) -> Self {
        let mut view = self.clone();
        view.spec.access_token.clear();
        view.spec.refresh_token.clear();
        view.spec.git_clone_token.clear();
        view
    }
}

/// Permissions the linked account holds on a remote repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPerm {
    #[serde(default)]
    pub pull: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub admin: bool,
}

/// Cached record of one remote repository the linked account administers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCodeRepository {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: SourceCodeRepositorySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCodeRepositorySpec {
    #[serde(default)]
    pub project_name: String,
    pub source_code_type: SourceCodeType,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub source_code_credential_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permissions: RepoPerm,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_branch: String,
}

impl SourceCodeRepository {
    pub fn new(source_code_type: SourceCodeType, url: &str, permissions: RepoPerm) -> Self {
        Self {
            metadata: ObjectMeta::default(),
            spec: SourceCodeRepositorySpec {
                project_name: String::new(),
                source_code_type,
                user_name: String::new(),
                source_code_credential_name: String::new(),
                url: url.to_string(),
                permissions,
                language: String::new(),
                default_branch: String::new(),
            },
        }
    }
}

/// CI pipeline definition. Only its project scoping matters here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: PipelineSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    pub project_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub repository_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_code_credential_name: String,
}

/// One run of a pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecution {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: PipelineExecutionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecutionSpec {
    pub project_name: String,
    #[serde(default)]
    pub pipeline_name: String,
    #[serde(default)]
    pub run: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub commit: String,
}
