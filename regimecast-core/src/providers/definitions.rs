//! Provider definitions using the define_provider! macro
//!
//! - OpenAI: GPT models (supports base_url, which also covers LiteLLM proxies)
//! - Anthropic: Claude models

use rig::providers::{anthropic, openai};

define_provider! {
    name: OpenAiProvider,
    provider_name: "openai",
    client_type: openai::Client,
    client_builder: |builder, base_url| {
        if let Some(url) = base_url {
            builder.base_url(url)
        } else {
            builder
        }
    },
    has_base_url: true
}

define_provider! {
    name: AnthropicProvider,
    provider_name: "anthropic",
    client_type: anthropic::Client,
    client_builder: |builder, _base_url| builder,
    has_base_url: false
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::providers::LlmProvider;

    #[test]
    fn test_openai_with_api_key() {
        let provider = OpenAiProvider::with_api_key("test-key", "gpt-4o-mini").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_openai_with_base_url() {
        let provider =
            OpenAiProvider::with_base_url("test-key", "http://localhost:4000", "gpt-4o-mini");
        assert!(provider.is_ok());
    }

    #[test]
    fn test_anthropic_with_api_key() {
        let provider =
            AnthropicProvider::with_api_key("test-key", "claude-sonnet-4-20250514").unwrap();
        assert_eq!(provider.name(), "anthropic");
    }
}
