//! Two-stage decode of raw documents into typed configs.
//!
//! Stage one is whatever the store hands back: a JSON document. Stage two is a
//! typed serde decode. [`ObjectMeta`](crate::model::ObjectMeta) rejects unknown
//! fields and has no representation for `metadata.creationTimestamp`, so that
//! single field is removed between the stages. It is the only field dropped.

use crate::errors::{Result, ScmError};
use crate::model::{ProviderConfig, SourceCodeType};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const CREATION_TIMESTAMP: &str = "creationTimestamp";

/// Remove `metadata.creationTimestamp` in place. Returns whether it was present.
pub fn strip_creation_timestamp(document: &mut Value) -> bool {
    document
        .get_mut("metadata")
        .and_then(Value::as_object_mut)
        .map(|metadata| metadata.remove(CREATION_TIMESTAMP).is_some())
        .unwrap_or(false)
}

/// Decode a raw document into `T`
pub fn decode<T: DeserializeOwned>(mut document: Value) -> Result<T> {
    if !document.is_object() {
        return Err(ScmError::decode("document is not an object"));
    }
    strip_creation_timestamp(&mut document);
    serde_json::from_value(document).map_err(|e| ScmError::decode(e.to_string()))
}

/// Decode a raw provider config document into the variant for `source_code_type`
pub fn decode_provider_config(
    source_code_type: SourceCodeType,
    document: Value,
) -> Result<ProviderConfig> {
    let config = match source_code_type {
        SourceCodeType::Github => ProviderConfig::Github(decode(document)?),
        SourceCodeType::BitbucketCloud => ProviderConfig::BitbucketCloud(decode(document)?),
        SourceCodeType::BitbucketServer => ProviderConfig::BitbucketServer(decode(document)?),
    };
    Ok(config)
}

/// Encode a typed provider config back into a raw document
pub fn encode_provider_config(config: &ProviderConfig) -> Result<Value> {
    let mut document = match config {
        ProviderConfig::Github(c) => serde_json::to_value(c)?,
        ProviderConfig::BitbucketCloud(c) => serde_json::to_value(c)?,
        ProviderConfig::BitbucketServer(c) => serde_json::to_value(c)?,
    };
    if let Some(object) = document.as_object_mut() {
        object.insert(
            "type".to_string(),
            Value::String(config.source_code_type().as_str().to_string()),
        );
    }
    Ok(document)
}
