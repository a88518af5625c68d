//! OpenAI-compatible client configuration with sensible defaults.

use crate::error::{Result, VidseekError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for embedding requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a client for an optional custom endpoint and timeout.
///
/// Any provider exposing the OpenAI embeddings API can be targeted through
/// `api_base`; the key is read from `OPENAI_API_KEY` as usual.
pub fn create_client_with(api_base: Option<&str>, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VidseekError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base.filter(|b| !b.is_empty()) {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Default request timeout.
pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
