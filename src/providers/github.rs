use super::{oauth_provider, unavailable, ProviderAdapter};
use super::types::{ActionRequest, ActionResponse, ConfigAction, ProviderAction};
use crate::config::Settings;
use crate::engine::{AccountPolicy, BaseProviderEngine};
use crate::errors::{Result, ScmError};
use crate::model::{
    AuthUserInput, GithubApplyInput, GithubPipelineConfig, GlobalGithubAuthConfig, OauthProvider,
    ProviderConfig, SourceCodeCredential, SourceCodeType,
};
use crate::store::{unstructured, AuthConfigSource};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the cluster-scoped GitHub auth config
pub const GLOBAL_AUTH_CONFIG_NAME: &str = "github";

pub struct GithubAdapter {
    engine: Arc<BaseProviderEngine>,
    auth_configs: Arc<dyn AuthConfigSource>,
    default_host: String,
}

/// Authorize URL users are sent to, e.g.
/// `https://github.com/login/oauth/authorize?client_id=abc&scope=repo+admin:repo_hook`
pub fn github_redirect_url(hostname: &str, tls: bool, client_id: &str, default_host: &str) -> String {
    let host = hostname.trim().trim_end_matches('/');
    let base = if host.is_empty() {
        format!("https://{default_host}")
    } else if tls {
        format!("https://{host}")
    } else {
        format!("http://{host}")
    };
    format!(
        "{base}/login/oauth/authorize?client_id={}&scope=repo+admin:repo_hook",
        urlencoding::encode(client_id)
    )
}

impl GithubAdapter {
    pub fn new(
        engine: Arc<BaseProviderEngine>,
        auth_configs: Arc<dyn AuthConfigSource>,
        settings: &Settings,
    ) -> Self {
        Self {
            engine,
            auth_configs,
            default_host: settings.github.default_host.clone(),
        }
    }

    async fn load(&self, namespace: &str) -> Result<GithubPipelineConfig> {
        match self.engine.configs().get(namespace, SourceCodeType::Github).await? {
            ProviderConfig::Github(config) => Ok(config),
            other => Err(ScmError::decode(format!(
                "expected a github config, found {}",
                other.source_code_type()
            ))),
        }
    }

    async fn global_auth(&self) -> Result<GlobalGithubAuthConfig> {
        let document = self
            .auth_configs
            .get_raw(GLOBAL_AUTH_CONFIG_NAME)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ScmError::config_not_found(format!("auth config {GLOBAL_AUTH_CONFIG_NAME}"))
                } else {
                    e
                }
            })?;
        unstructured::decode(document)
    }

    /// Replace client credentials and host with the global auth config's
    async fn inherit_global_auth(&self, config: &mut GithubPipelineConfig) -> Result<()> {
        let global = self.global_auth().await?;
        debug!("Inheriting GitHub client settings from the global auth config");
        config.client_id = global.client_id;
        config.client_secret = global.client_secret;
        config.hostname = global.hostname;
        config.tls = global.tls;
        Ok(())
    }

    async fn link_account(
        &self,
        request: &ActionRequest,
        code: &str,
        config: &GithubPipelineConfig,
    ) -> Result<SourceCodeCredential> {
        let provider_config = ProviderConfig::Github(config.clone());
        let credential = self
            .engine
            .auth_add_account_with(
                AccountPolicy::GITHUB,
                request.user(),
                code,
                &provider_config,
                &config.project_name,
                SourceCodeType::Github,
            )
            .await?;
        self.engine
            .refresh_repos_by_credential_and_config(&credential, &provider_config)
            .await?;
        Ok(credential)
    }

    async fn test_and_apply(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: GithubApplyInput = request.decode_body()?;
        let mut to_update = self.load(request.namespace()).await?;

        to_update.client_id = input.client_id;
        to_update.client_secret = input.client_secret;
        to_update.hostname = input.hostname;
        to_update.tls = input.tls;
        to_update.inherit = input.inherit_auth;
        if !input.redirect_url.is_empty() {
            to_update.redirect_url = input.redirect_url;
        }
        if to_update.inherit {
            self.inherit_global_auth(&mut to_update).await?;
        }

        self.link_account(request, &input.code, &to_update).await?;

        to_update.enabled = true;
        if to_update.inherit {
            // the secret stays in the global config only
            to_update.client_secret.clear();
        }
        self.engine
            .configs()
            .update(&ProviderConfig::Github(to_update))
            .await?;
        info!("Enabled github in {}", request.namespace());
        Ok(ActionResponse::ok())
    }

    async fn login(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let input: AuthUserInput = request.decode_body()?;
        let mut config = self.load(request.namespace()).await?;
        if !config.enabled {
            return Err(ScmError::not_configured("github oauth app is not configured"));
        }
        if config.inherit {
            self.inherit_global_auth(&mut config).await?;
        }
        if !input.redirect_url.is_empty() {
            config.redirect_url = input.redirect_url.clone();
        }

        let credential = self.link_account(request, &input.code, &config).await?;
        ActionResponse::json(&credential.public_view())
    }
}

#[async_trait]
impl ProviderAdapter for GithubAdapter {
    fn source_code_type(&self) -> SourceCodeType {
        SourceCodeType::Github
    }

    async fn config_action(
        &self,
        action: ConfigAction,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        match action {
            ConfigAction::Disable => {
                self.engine
                    .disable_action(request.namespace(), SourceCodeType::Github)
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
        let redirect_url = github_redirect_url(
            &config.hostname,
            config.tls,
            &config.client_id,
            &self.default_host,
        );
        Ok(oauth_provider(
            namespace,
            &config.project_name,
            SourceCodeType::Github,
            redirect_url,
        ))
    }
}
