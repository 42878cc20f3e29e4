pub mod bitbucket_cloud;
pub mod bitbucket_server;
pub mod factory;
pub mod github;
pub mod types;

use crate::errors::{Result, ScmError};
use crate::model::{ObjectMeta, OauthProvider, SourceCodeType};
use async_trait::async_trait;
use std::fmt::Display;

pub use bitbucket_cloud::BitbucketCloudAdapter;
pub use bitbucket_server::BitbucketServerAdapter;
pub use factory::ProviderRegistry;
pub use github::GithubAdapter;
pub use types::*;

/// Action handlers for one SCM type
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn source_code_type(&self) -> SourceCodeType;

    /// Actions on the `{provider}PipelineConfig` resource
    async fn config_action(
        &self,
        action: ConfigAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse>;

    /// Actions on the `{provider}Provider` resource
    async fn provider_action(
        &self,
        action: ProviderAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse>;

    /// Provider resource rendered from the stored config in `namespace`
    async fn provider_resource(&self, namespace: &str) -> Result<OauthProvider>;
}

pub type DynAdapter = std::sync::Arc<dyn ProviderAdapter>;

pub(crate) fn unavailable<A: Display>(action: A) -> Result<ActionResponse> {
    Err(ScmError::action_not_available(action.to_string()))
}

pub(crate) fn oauth_provider(
    namespace: &str,
    project_name: &str,
    source_code_type: SourceCodeType,
    redirect_url: String,
) -> OauthProvider {
    OauthProvider {
        metadata: ObjectMeta::named(namespace, source_code_type.as_str()),
        project_name: project_name.to_string(),
        source_code_type,
        redirect_url,
    }
}
