use super::unstructured::{decode_provider_config, encode_provider_config};
use super::RawConfigStore;
use crate::errors::{Result, ScmError};
use crate::model::{ProviderConfig, SourceCodeType};
use std::sync::Arc;
use tracing::debug;

/// Typed access to provider configs, keyed by project namespace and provider type
#[derive(Clone)]
pub struct ConfigStore {
    raw: Arc<dyn RawConfigStore>,
}

impl ConfigStore {
    pub fn new(raw: Arc<dyn RawConfigStore>) -> Self {
        Self { raw }
    }

    /// Load and decode the config for `source_code_type` in `namespace`
    pub async fn get(
        &self,
        namespace: &str,
        source_code_type: SourceCodeType,
    ) -> Result<ProviderConfig> {
        debug!("Loading {} config in {}", source_code_type, namespace);
        let document = self
            .raw
            .get_raw(namespace, source_code_type.as_str())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ScmError::config_not_found(format!(
                        "{}:{}",
                        namespace,
                        source_code_type.as_str()
                    ))
                } else {
                    e
                }
            })?;
        decode_provider_config(source_code_type, document)
    }

    /// Persist `config` and return the stored result
    pub async fn update(&self, config: &ProviderConfig) -> Result<ProviderConfig> {
        let metadata = config.metadata();
        let document = encode_provider_config(config)?;
        let stored = self
            .raw
            .update_raw(&metadata.namespace, &metadata.name, document)
            .await?;
        decode_provider_config(config.source_code_type(), stored)
    }
}
