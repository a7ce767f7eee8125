//! LLM provider integration

#[macro_use]
mod macros;

pub mod definitions;
pub mod factory;
pub mod traits;

pub use definitions::{AnthropicProvider, OpenAiProvider};
pub use factory::create_provider;
pub use traits::{CompletionRequest, CompletionResponse, LlmProvider, TokenUsage};
