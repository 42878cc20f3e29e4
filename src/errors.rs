/// Source code provider error types
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    /// Caller identity missing on an account-linking action
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Action name not handled by the target resource
    #[error("Action not available: {0}")]
    ActionNotAvailable(String),

    /// Request body could not be decoded into the expected input
    #[error("Invalid body content: {0}")]
    InvalidBodyContent(String),

    /// Failure from the remote SCM (OAuth exchange or API call)
    #[error("Remote provider error: {0}")]
    Remote(String),

    /// Stored provider configuration is missing
    #[error("Provider config not found: {0}")]
    ConfigNotFound(String),

    /// Stored document could not be decoded into its typed form
    #[error("Decode error: {0}")]
    Decode(String),

    /// Provider is not enabled for the project
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Optimistic concurrency violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Object with the same namespace/name already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other storage layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key generation or signing errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification used by the action surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    ActionNotAvailable,
    InvalidBodyContent,
    RemoteProviderError,
    ConfigNotFound,
    DecodeFailure,
    NotConfigured,
    StorageConflict,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::ActionNotAvailable => 404,
            ErrorKind::InvalidBodyContent => 422,
            ErrorKind::RemoteProviderError => 502,
            ErrorKind::ConfigNotFound => 404,
            ErrorKind::DecodeFailure => 500,
            ErrorKind::NotConfigured => 400,
            ErrorKind::StorageConflict => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

impl ScmError {
    pub fn unauthenticated<S: Into<String>>(msg: S) -> Self {
        ScmError::Unauthenticated(msg.into())
    }

    pub fn action_not_available<S: Into<String>>(action: S) -> Self {
        ScmError::ActionNotAvailable(action.into())
    }

    pub fn invalid_body<S: Into<String>>(msg: S) -> Self {
        ScmError::InvalidBodyContent(msg.into())
    }

    pub fn remote<S: Into<String>>(msg: S) -> Self {
        ScmError::Remote(msg.into())
    }

    pub fn remote_api(status: u16, message: String) -> Self {
        ScmError::Remote(format!("status {status}: {message}"))
    }

    pub fn config_not_found<S: Into<String>>(msg: S) -> Self {
        ScmError::ConfigNotFound(msg.into())
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        ScmError::Decode(msg.into())
    }

    pub fn not_configured<S: Into<String>>(msg: S) -> Self {
        ScmError::NotConfigured(msg.into())
    }

    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        ScmError::Conflict(msg.into())
    }

    pub fn already_exists<S: Into<String>>(msg: S) -> Self {
        ScmError::AlreadyExists(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ScmError::NotFound(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        ScmError::Storage(msg.into())
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        ScmError::Validation(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        ScmError::Config(msg.into())
    }

    pub fn crypto<S: Into<String>>(msg: S) -> Self {
        ScmError::Crypto(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScmError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ScmError::ActionNotAvailable(_) => ErrorKind::ActionNotAvailable,
            ScmError::InvalidBodyContent(_) => ErrorKind::InvalidBodyContent,
            ScmError::Remote(_) | ScmError::Http(_) => ErrorKind::RemoteProviderError,
            ScmError::ConfigNotFound(_) => ErrorKind::ConfigNotFound,
            ScmError::Decode(_) | ScmError::Json(_) => ErrorKind::DecodeFailure,
            ScmError::NotConfigured(_) => ErrorKind::NotConfigured,
            ScmError::Conflict(_) | ScmError::AlreadyExists(_) => ErrorKind::StorageConflict,
            ScmError::NotFound(_) => ErrorKind::NotFound,
            ScmError::Storage(_)
            | ScmError::Validation(_)
            | ScmError::Config(_)
            | ScmError::Crypto(_)
            | ScmError::Url(_) => ErrorKind::Internal,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ScmError::AlreadyExists(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ScmError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ScmError::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, ScmError>;
