//! Clients for OpenAI-compatible APIs.

use crate::config::ApiSettings;
use crate::error::{Result, VettError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the API described by `api`.
///
/// The key is read from the environment variable named in the settings. An
/// empty `api_base` keeps the OpenAI default endpoint.
pub fn create_client(api: &ApiSettings) -> Result<Client<OpenAIConfig>> {
    let key = std::env::var(&api.api_key_env).map_err(|_| {
        VettError::BackendUnavailable(format!("{} is not set", api.api_key_env))
    })?;

    let mut config = OpenAIConfig::new().with_api_key(key);
    if !api.api_base.is_empty() {
        config = config.with_api_base(&api.api_base);
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(api.timeout_secs))
        .build()
        .map_err(|e| VettError::BackendUnavailable(format!("HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
