use crate::errors::{ErrorKind, Result, ScmError};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Header carrying the caller's user ID
pub const IMPERSONATE_USER_HEADER: &str = "Impersonate-User";

/// Actions on a `{provider}PipelineConfig` resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Disable,
    TestAndApply,
    GenerateKeys,
    RequestLogin,
}

impl ConfigAction {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "disable" => Ok(ConfigAction::Disable),
            "testAndApply" => Ok(ConfigAction::TestAndApply),
            "generateKeys" => Ok(ConfigAction::GenerateKeys),
            "requestLogin" => Ok(ConfigAction::RequestLogin),
            other => Err(ScmError::action_not_available(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigAction::Disable => "disable",
            ConfigAction::TestAndApply => "testAndApply",
            ConfigAction::GenerateKeys => "generateKeys",
            ConfigAction::RequestLogin => "requestLogin",
        }
    }
}

/// Actions on a `{provider}Provider` resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderAction {
    Login,
    RequestLogin,
}

impl ProviderAction {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "login" => Ok(ProviderAction::Login),
            "requestLogin" => Ok(ProviderAction::RequestLogin),
            other => Err(ScmError::action_not_available(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderAction::Login => "login",
            ProviderAction::RequestLogin => "requestLogin",
        }
    }
}

impl fmt::Display for ConfigAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProviderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed inbound action
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    pub action: String,
    /// `{namespace}:{name}` of the target resource
    pub id: String,
    pub user_id: Option<String>,
    pub body: Option<Value>,
}

impl ActionRequest {
    pub fn new(action: &str, id: &str) -> Self {
        Self {
            action: action.to_string(),
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Caller identity taken from the `Impersonate-User` header
    pub fn from_headers(action: &str, id: &str, headers: &HeaderMap, body: Option<Value>) -> Self {
        let user_id = headers
            .get(IMPERSONATE_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self {
            action: action.to_string(),
            id: id.to_string(),
            user_id,
            body,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Empty when the caller is anonymous
    pub fn user(&self) -> &str {
        self.user_id.as_deref().unwrap_or_default()
    }

    /// Namespace part of the target resource ID
    pub fn namespace(&self) -> &str {
        crate::engine::naming::parse_ref(&self.id).0
    }

    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self
            .body
            .clone()
            .ok_or_else(|| ScmError::invalid_body("request body is required"))?;
        serde_json::from_value(body).map_err(|e| ScmError::invalid_body(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    pub fn json<T: Serialize>(body: &T) -> Result<Self> {
        Ok(Self {
            status: 200,
            body: Some(serde_json::to_value(body)?),
        })
    }

    pub fn from_error(error: &ScmError) -> Self {
        let kind = error.kind();
        Self {
            status: kind.status_code(),
            body: Some(json!({
                "type": "error",
                "status": kind.status_code(),
                "code": error_code(kind),
                "message": error.to_string(),
            })),
        }
    }
}

fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Unauthenticated => "Unauthorized",
        ErrorKind::ActionNotAvailable => "ActionNotAvailable",
        ErrorKind::InvalidBodyContent => "InvalidBodyContent",
        ErrorKind::RemoteProviderError => "RemoteProviderError",
        ErrorKind::ConfigNotFound => "ConfigNotFound",
        ErrorKind::DecodeFailure => "DecodeFailure",
        ErrorKind::NotConfigured => "NotConfigured",
        ErrorKind::StorageConflict => "Conflict",
        ErrorKind::NotFound => "NotFound",
        ErrorKind::Internal => "ServerError",
    }
}
