use super::{oauth_provider, unavailable, ProviderAdapter};
use super::types::{ActionRequest, ActionResponse, ConfigAction, ProviderAction};
use crate::config::Settings;
use crate::engine::BaseProviderEngine;
use crate::errors::{Result, ScmError};
use crate::model::{
    AuthUserInput, BitbucketCloudApplyInput, BitbucketCloudPipelineConfig, OauthProvider,
    ProviderConfig, SourceCodeCredential, SourceCodeType,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct BitbucketCloudAdapter {
    engine: Arc<BaseProviderEngine>,
    web_url: String,
}

pub fn bitbucket_cloud_redirect_url(web_url: &str, client_id: &str) -> String {
    format!(
        "{}/site/oauth2/authorize?client_id={}&response_type=code",
        web_url.trim_end_matches('/'),
        urlencoding::encode(client_id)
    )
}

impl BitbucketCloudAdapter {
    pub fn new(engine: Arc<BaseProviderEngine>, settings: &Settings) -> Self {
        Self {
            engine,
            web_url: settings.bitbucket_cloud.web_url.clone(),
        }
    }

    async fn load(&self, namespace: &str) -> Result<BitbucketCloudPipelineConfig> {
        match self
            .engine
            .configs()
            .get(namespace, SourceCodeType::BitbucketCloud)
            .await?
        {
            ProviderConfig::BitbucketCloud(config) => Ok(config),
            other => Err(ScmError::decode(format!(
                "expected a bitbucketcloud config, found {}",
                other.source_code_type()
            ))),
        }
    }

    async fn link_account(
        &self,
        request: &ActionRequest,
        code: &str,
        config: &BitbucketCloudPipelineConfig,
    ) -> Result<SourceCodeCredential> {
        let provider_config = ProviderConfig::BitbucketCloud(config.clone());
        let credential = self
            .engine
            .auth_add_account(
                request.user(),
                code,
                &provider_config,
                &config.project_name,
                SourceCodeType::BitbucketCloud,
            )
            .await?;
        self.engine
            .refresh_repos_by_credential_and_config(&credential, &provider_config)
            .await?;
        Ok(credential)
    }

    async fn test_and_apply(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: BitbucketCloudApplyInput = request.decode_body()?;
        let mut to_update = self.load(request.namespace()).await?;
        to_update.client_id = input.client_id;
        to_update.client_secret = input.client_secret;
        to_update.redirect_url = input.redirect_url;

        self.link_account(request, &input.code, &to_update).await?;

        to_update.enabled = true;
        self.engine
            .configs()
            .update(&ProviderConfig::BitbucketCloud(to_update))
            .await?;
        info!("Enabled bitbucketcloud in {}", request.namespace());
        Ok(ActionResponse::ok())
    }

    async fn login(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: AuthUserInput = request.decode_body()?;
        let config = self.load(request.namespace()).await?;
        if !config.enabled {
            return Err(ScmError::not_configured(
                "bitbucket oauth app is not configured",
            ));
        }
        let credential = self.link_account(request, &input.code, &config).await?;
        ActionResponse::json(&credential.public_view())
    }
}

#[async_trait]
impl ProviderAdapter for BitbucketCloudAdapter {
    fn source_code_type(&self) -> SourceCodeType {
        SourceCodeType::BitbucketCloud
    }

    async fn config_action(
        &self,
        action: ConfigAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        match action {
            ConfigAction::Disable => {
                self.engine
                    .disable_action(request.namespace(), SourceCodeType::BitbucketCloud)
                    .await?;
                Ok(ActionResponse::ok())
            }
            ConfigAction::TestAndApply => self.test_and_apply(request).await,
            ConfigAction::GenerateKeys | ConfigAction::RequestLogin => unavailable(action),
        }
    }

    async fn provider_action(
        &self,
        action: ProviderAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        match action {
            ProviderAction::Login => self.login(request).await,
            ProviderAction::RequestLogin => unavailable(action),
        }
    }

    async fn provider_resource(&self, namespace: &str) -> Result<OauthProvider> {
        let config = self.load(namespace).await?;
        Ok(oauth_provider(
            namespace,
            &config.project_name,
            SourceCodeType::BitbucketCloud,
            bitbucket_cloud_redirect_url(&self.web_url, &config.client_id),
        ))
    }
}
