use super::types::{ActionRequest, ActionResponse, ConfigAction, ProviderAction};
use super::{BitbucketCloudAdapter, BitbucketServerAdapter, DynAdapter, GithubAdapter};
use crate::config::Settings;
use crate::engine::BaseProviderEngine;
use crate::errors::{Result, ScmError};
use crate::model::{OauthProvider, SourceCodeType};
use crate::store::AuthConfigSource;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes parsed actions to the adapter for a provider type
#[derive(Default)]
pub struct ProviderRegistry {
    adapters: BTreeMap<SourceCodeType, DynAdapter>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the GitHub, Bitbucket Cloud and Bitbucket Server adapters
    pub fn with_defaults(
        engine: Arc<BaseProviderEngine>,
        auth_configs: Arc<dyn AuthConfigSource>,
        settings: &Settings,
    ) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(GithubAdapter::new(
            engine.clone(),
            auth_configs,
            settings,
        )));
        registry.register(Arc::new(BitbucketCloudAdapter::new(engine.clone(), settings)));
        registry.register(Arc::new(BitbucketServerAdapter::new(engine, settings)?));
        Ok(registry)
    }

    pub fn register(&mut self, adapter: DynAdapter) {
        self.adapters.insert(adapter.source_code_type(), adapter);
    }

    pub fn supported_providers(&self) -> Vec<SourceCodeType> {
        self.adapters.keys().copied().collect()
    }

    pub fn adapter(&self, source_code_type: SourceCodeType) -> Result<DynAdapter> {
        self.adapters
            .get(&source_code_type)
            .cloned()
            .ok_or_else(|| ScmError::not_found(format!("no adapter for {source_code_type}")))
    }

    pub async fn dispatch_config_action(
        &self,
        source_code_type: SourceCodeType,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        let action = ConfigAction::parse(&request.action)?;
        debug!("{} config action {} on {}", source_code_type, action, request.id);
        self.adapter(source_code_type)?
            .config_action(action, request)
            .await
    }

    pub async fn dispatch_provider_action(
        &self,
        source_code_type: SourceCodeType,
        request: &ActionRequest,
    ) -> Result<ActionResponse> {
        let action = ProviderAction::parse(&request.action)?;
        debug!("{} provider action {} on {}", source_code_type, action, request.id);
        self.adapter(source_code_type)?
            .provider_action(action, request)
            .await
    }

    /// Like [`Self::dispatch_config_action`], with errors rendered as responses
    pub async fn handle_config_action(
        &self,
        source_code_type: SourceCodeType,
        request: &ActionRequest,
    ) -> ActionResponse {
        respond(request, self.dispatch_config_action(source_code_type, request).await)
    }

    pub async fn handle_provider_action(
        &self,
        source_code_type: SourceCodeType,
        request: &ActionRequest,
    ) -> ActionResponse {
        respond(request, self.dispatch_provider_action(source_code_type, request).await)
    }

    /// Provider resources for every registered type configured in `namespace`
    pub async fn list_providers(&self, namespace: &str) -> Result<Vec<OauthProvider>> {
        let mut providers = Vec::new();
        for adapter in self.adapters.values() {
            match adapter.provider_resource(namespace).await {
                Ok(provider) => providers.push(provider),
                Err(ScmError::ConfigNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(providers)
    }
}

fn respond(request: &ActionRequest, result: Result<ActionResponse>) -> ActionResponse {
    match result {
        Ok(response) => response,
        Err(e) => {
            warn!("Action {} on {} failed: {}", request.action, request.id, e);
            ActionResponse::from_error(&e)
        }
    }
}
