use crate::config::HttpSettings;
use crate::errors::{Result, ScmError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;

/// Shared `reqwest` client with the configured timeout and user agent
pub fn build_client(settings: &HttpSettings) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.clone())
        .default_headers(headers)
        .build()
        .map_err(|e| ScmError::config(format!("Failed to create HTTP client: {}", e)))
}

/// Deserialize a successful JSON response, anything else is a remote error
pub async fn handle_response<T>(response: Response) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let text = handle_text(response).await?;
    serde_json::from_str(&text)
        .map_err(|e| ScmError::remote(format!("Failed to parse JSON response: {}", e)))
}

/// Body of a successful response as text
pub async fn handle_text(response: Response) -> Result<String> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ScmError::remote(format!("Failed to read response body: {}", e)))?;

    if status.is_success() {
        // bodies may carry tokens, so only the size is traced
        trace!("Response body: {} bytes", text.len());
        Ok(text)
    } else {
        Err(ScmError::remote_api(status.as_u16(), text))
    }
}
