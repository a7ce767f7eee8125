//! Macro for generating LLM provider implementations
//!
//! Every rig-backed provider shares the same struct layout, constructors and
//! `LlmProvider::complete` body; only the client type and the optional
//! `base_url` hook differ.

/// Generates a provider struct with constructors and an `LlmProvider` impl
///
/// # Arguments
///
/// * `name` - The struct name (e.g., `AnthropicProvider`)
/// * `provider_name` - The provider identifier string (e.g., `"anthropic"`)
/// * `client_type` - The rig client type (e.g., `anthropic::Client`)
/// * `client_builder` - Expression applied to the builder, with access to the optional `base_url`
/// * `has_base_url` - Whether to generate a `with_base_url()` constructor
///
/// # Example
///
/// ```ignore
/// define_provider! {
///     name: AnthropicProvider,
///     provider_name: "anthropic",
///     client_type: anthropic::Client,
///     client_builder: |builder, _base_url| builder,
///     has_base_url: false
/// }
/// ```
#[macro_export]
macro_rules! define_provider {
    (
        name: $name:ident,
        provider_name: $provider_name:expr,
        client_type: $client_type:ty,
        client_builder: |$builder:ident, $base_url:ident| $client_expr:expr,
        has_base_url: $has_base_url:tt
    ) => {
        /// Provider implementation using rig-core
        pub struct $name {
            client: $client_type,
            model: String,
        }

        impl $name {
            /// Create with an explicit API key
            pub fn with_api_key(
                api_key: impl Into<String>,
                model: impl Into<String>,
            ) -> $crate::Result<Self> {
                let mut $builder = <$client_type>::builder().api_key(api_key.into());
                let $base_url: Option<String> = None;
                $builder = $client_expr;
                let client = $builder.build().map_err(|e| {
                    $crate::Error::Provider(format!(
                        "Failed to build {} client: {}",
                        $provider_name, e
                    ))
                })?;

                Ok(Self {
                    client,
                    model: model.into(),
                })
            }

            define_provider!(@with_base_url $has_base_url, $client_type, $provider_name, $builder, $base_url, $client_expr);
        }

        #[async_trait::async_trait]
        impl $crate::providers::LlmProvider for $name {
            fn name(&self) -> &str {
                $provider_name
            }

            fn model(&self) -> &str {
                &self.model
            }

            async fn complete(
                &self,
                request: $crate::providers::CompletionRequest,
            ) -> $crate::Result<$crate::providers::CompletionResponse> {
                use rig::client::CompletionClient;
                use rig::completion::Prompt;

                let prompt = request.prompt;

                let mut builder = self
                    .client
                    .agent(&self.model)
                    .preamble(
                        request
                            .system
                            .as_deref()
                            .unwrap_or("You are a helpful assistant."),
                    )
                    .max_tokens(request.max_tokens.unwrap_or(4096) as u64);
                if let Some(temperature) = request.temperature {
                    builder = builder.temperature(f64::from(temperature));
                }
                let agent = builder.build();

                tracing::debug!(provider = $provider_name, model = %self.model, "Sending completion request");

                let response = agent.prompt(prompt.as_str()).await.map_err(|e| {
                    $crate::Error::Provider(format!("{} completion failed: {}", $provider_name, e))
                })?;

                // rig does not expose raw usage through Prompt, so estimate
                let usage = $crate::providers::TokenUsage {
                    input_tokens: prompt.len() as u64 / 4,
                    output_tokens: response.len() as u64 / 4,
                };

                Ok($crate::providers::CompletionResponse {
                    content: Some(response),
                    usage,
                })
            }
        }
    };

    (@with_base_url true, $client_type:ty, $provider_name:expr, $builder:ident, $base_url:ident, $client_expr:expr) => {
        /// Create with a custom base URL (LiteLLM proxy or compatible APIs)
        pub fn with_base_url(
            api_key: impl Into<String>,
            base_url: impl Into<String>,
            model: impl Into<String>,
        ) -> $crate::Result<Self> {
            let mut $builder = <$client_type>::builder().api_key(api_key.into());
            let $base_url: Option<String> = Some(base_url.into());
            $builder = $client_expr;
            let client = $builder.build().map_err(|e| {
                $crate::Error::Provider(format!(
                    "Failed to build {} client: {}",
                    $provider_name, e
                ))
            })?;

            Ok(Self {
                client,
                model: model.into(),
            })
        }
    };

    (@with_base_url false, $client_type:ty, $provider_name:expr, $builder:ident, $base_url:ident, $client_expr:expr) => {};
}
