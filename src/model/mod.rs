//! Typed resources handled by the provider engine
//!
//! Everything here mirrors the persisted shape of the custom resources
//! (camelCase JSON), so a value can round-trip through the object store
//! without losing fields.

pub mod inputs;
pub mod meta;
pub mod provider_config;
pub mod resources;

pub use inputs::{
    AuthUserInput, BitbucketCloudApplyInput, BitbucketServerApplyInput,
    BitbucketServerRequestLoginInput, BitbucketServerRequestLoginOutput, GithubApplyInput,
};
pub use meta::{ObjectMeta, SourceCodeType};
pub use provider_config::{
    BitbucketCloudPipelineConfig, BitbucketServerPipelineConfig, GithubPipelineConfig,
    GlobalGithubAuthConfig, OauthProvider, ProviderConfig,
};
pub use resources::{
    Pipeline, PipelineExecution, PipelineExecutionSpec, PipelineSpec, RepoPerm,
    SourceCodeCredential, SourceCodeCredentialSpec, SourceCodeCredentialStatus,
    SourceCodeRepository, SourceCodeRepositorySpec,
};
