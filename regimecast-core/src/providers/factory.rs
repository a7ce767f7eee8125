//! Provider factory for creating LLM provider instances

use std::sync::Arc;

use tracing::warn;

use crate::Result;
use crate::config::{ProviderConfig, ProviderName};

use super::{AnthropicProvider, LlmProvider, OpenAiProvider};

const LITELLM_DEFAULT_URL: &str = "http://localhost:4000";

/// Create a provider from configuration.
///
/// A missing API key is not an error here; the provider is built with an
/// empty key and the first request fails with the provider's auth error.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    let api_key = match &config.api_key {
        Some(key) => key.clone(),
        None => {
            warn!(
                provider = ?config.name,
                "{} not set, model calls will fail authentication",
                config.name.env_var()
            );
            String::new()
        }
    };

    match config.name {
        ProviderName::OpenAi => {
            let provider = match &config.base_url {
                Some(base_url) => OpenAiProvider::with_base_url(api_key, base_url, config.model())?,
                None => OpenAiProvider::with_api_key(api_key, config.model())?,
            };
            Ok(Arc::new(provider))
        }
        ProviderName::LiteLlm => {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| LITELLM_DEFAULT_URL.to_string());
            let provider = OpenAiProvider::with_base_url(api_key, base_url, config.model())?;
            Ok(Arc::new(provider))
        }
        ProviderName::Anthropic => {
            let provider = AnthropicProvider::with_api_key(api_key, config.model())?;
            Ok(Arc::new(provider))
        }
    }
}
