use super::{oauth_provider, ProviderAdapter};
use super::types::{ActionRequest, ActionResponse, ConfigAction, ProviderAction};
use crate::config::Settings;
use crate::engine::naming::project_name;
use crate::engine::BaseProviderEngine;
use crate::errors::{Result, ScmError};
use crate::model::{
    AuthUserInput, BitbucketServerApplyInput, BitbucketServerPipelineConfig,
    BitbucketServerRequestLoginInput, BitbucketServerRequestLoginOutput, OauthProvider,
    ProviderConfig, SourceCodeCredential, SourceCodeType,
};
use crate::oauth1::{generate_key_material, OAuth1Consumer};
use crate::remote::http::build_client;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

pub struct BitbucketServerAdapter {
    engine: Arc<BaseProviderEngine>,
    http: Client,
    key_bits: usize,
}

impl BitbucketServerAdapter {
    pub fn new(engine: Arc<BaseProviderEngine>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            engine,
            http: build_client(&settings.http)?,
            key_bits: settings.bitbucket_server.key_bits,
        })
    }

    async fn load(&self, namespace: &str) -> Result<BitbucketServerPipelineConfig> {
        match self
            .engine
            .configs()
            .get(namespace, SourceCodeType::BitbucketServer)
            .await?
        {
            ProviderConfig::BitbucketServer(config) => Ok(config),
            other => Err(ScmError::decode(format!(
                "expected a bitbucketserver config, found {}",
                other.source_code_type()
            ))),
        }
    }

    async fn generate_keys(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let mut config = self.load(request.namespace()).await?;
        let bits = self.key_bits;
        let material = tokio::task::spawn_blocking(move || generate_key_material(bits))
            .await
            .map_err(|e| ScmError::crypto(format!("Key generation task failed: {e}")))??;
        config.consumer_key = material.consumer_key;
        config.private_key = material.private_key;
        config.public_key = material.public_key;
        self.engine
            .configs()
            .update(&ProviderConfig::BitbucketServer(config))
            .await?;
        info!("Generated bitbucketserver consumer keys in {}", request.namespace());
        Ok(ActionResponse::ok())
    }

    async fn request_login(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: BitbucketServerRequestLoginInput = request.decode_body()?;
        let mut config = self.load(request.namespace()).await?;

        if let Some(hostname) = input.hostname.filter(|h| !h.is_empty()) {
            config.hostname = hostname;
        }
        if let Some(tls) = input.tls {
            config.tls = tls;
        }
        if !input.redirect_url.is_empty() {
            config.redirect_url = input.redirect_url;
        }
        if config.hostname.is_empty() {
            return Err(ScmError::invalid_body("hostname is required"));
        }

        let consumer = OAuth1Consumer::from_pem(
            &config.consumer_key,
            &config.private_key,
            &config.base_url(),
            self.http.clone(),
        )?;
        debug!("Requesting a Bitbucket Server login URL from {}", config.base_url());
        let (_, login_url) = consumer
            .get_request_token_and_url(&config.redirect_url)
            .await?;

        ActionResponse::json(&BitbucketServerRequestLoginOutput::new(login_url))
    }

    async fn link_account(
        &self,
        request: &ActionRequest,
        code: &str,
        config: &BitbucketServerPipelineConfig,
    ) -> Result<SourceCodeCredential> {
        let provider_config = ProviderConfig::BitbucketServer(config.clone());
        let credential = self
            .engine
            .auth_add_account(
                request.user(),
                code,
                &provider_config,
                &config.project_name,
                SourceCodeType::BitbucketServer,
            )
            .await?;
        self.engine
            .refresh_repos_by_credential_and_config(&credential, &provider_config)
            .await?;
        Ok(credential)
    }

    async fn test_and_apply(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: BitbucketServerApplyInput = request.decode_body()?;
        let mut to_update = self.load(request.namespace()).await?;
        if !input.hostname.is_empty() {
            to_update.hostname = input.hostname;
            to_update.tls = input.tls;
        }
        if !input.redirect_url.is_empty() {
            to_update.redirect_url = input.redirect_url;
        }

        // bare project name; `LoginCode` splits the code from the left
        let code = format!(
            "{}:{}:{}",
            project_name(&to_update.project_name),
            input.oauth_token,
            input.oauth_verifier
        );
        self.link_account(request, &code, &to_update).await?;

        to_update.enabled = true;
        self.engine
            .configs()
            .update(&ProviderConfig::BitbucketServer(to_update))
            .await?;
        info!("Enabled bitbucketserver in {}", request.namespace());
        Ok(ActionResponse::ok())
    }

    async fn login(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: AuthUserInput = request.decode_body()?;
        let config = self.load(request.namespace()).await?;
        if !config.enabled {
            return Err(ScmError::not_configured(
                "bitbucket server oauth app is not configured",
            ));
        }
        let code = format!("{}:{}", project_name(&config.project_name), input.code);
        let credential = self.link_account(request, &code, &config).await?;
        ActionResponse::json(&credential.public_view())
    }
}

#[async_trait]
impl ProviderAdapter for BitbucketServerAdapter {
    fn source_code_type(&self) -> SourceCodeType {
        SourceCodeType::BitbucketServer
    }

    async fn config_action(
        &self,
        action: ConfigAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        match action {
            ConfigAction::Disable => {
                self.engine
                    .disable_action(request.namespace(), SourceCodeType::BitbucketServer)
                    .await?;
                Ok(ActionResponse::ok())
            }
            ConfigAction::TestAndApply => self.test_and_apply(request).await,
            ConfigAction::GenerateKeys => self.generate_keys(request).await,
            ConfigAction::RequestLogin => self.request_login(request).await,
        }
    }

    async fn provider_action(
        &self,
        action: ProviderAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        match action {
            ProviderAction::Login => self.login(request).await,
            ProviderAction::RequestLogin => self.request_login(request).await,
        }
    }

    async fn provider_resource(&self, namespace: &str) -> Result<OauthProvider> {
        let config = self.load(namespace).await?;
        Ok(oauth_provider(
            namespace,
            &config.project_name,
            SourceCodeType::BitbucketServer,
            config.redirect_url,
        ))
    }
}
