//! Error types for regimecast-core

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using regimecast Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for regimecast
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(regimecast::config))]
    Config(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(regimecast::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(regimecast::serde))]
    Serde(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    #[diagnostic(code(regimecast::toml))]
    Toml(#[from] toml::de::Error),

    #[error("Failed to fetch price: {0}")]
    #[diagnostic(code(regimecast::price))]
    Price(String),

    #[error("Failed to fetch technical indicators: {0}")]
    #[diagnostic(code(regimecast::indicators))]
    Indicators(String),

    #[error("Failed to analyze market regime: {0}")]
    #[diagnostic(code(regimecast::analysis))]
    Analysis(String),

    #[error("Provider error: {0}")]
    #[diagnostic(code(regimecast::provider))]
    Provider(String),

    #[error("Model returned a label outside the allowed set: {0:?}")]
    #[diagnostic(
        code(regimecast::classification),
        help("expected exactly one of: Trending Up, Trending Down, Ranging")
    )]
    Classification(String),

    #[error("Invalid params: {0}")]
    #[diagnostic(code(regimecast::invalid_params))]
    InvalidParams(String),

    #[error("Transport error: {0}")]
    #[diagnostic(code(regimecast::transport))]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_errors_carry_context_prefix() {
        assert_eq!(
            Error::Price("No price data found for BTC".to_string()).to_string(),
            "Failed to fetch price: No price data found for BTC"
        );
        assert_eq!(
            Error::Indicators("Indicator errors: macd: rate limited".to_string()).to_string(),
            "Failed to fetch technical indicators: Indicator errors: macd: rate limited"
        );
        assert_eq!(
            Error::Analysis("boom".to_string()).to_string(),
            "Failed to analyze market regime: boom"
        );
    }

    #[test]
    fn test_classification_error_quotes_reply() {
        let err = Error::Classification("Sideways".to_string());
        assert_eq!(
            err.to_string(),
            "Model returned a label outside the allowed set: \"Sideways\""
        );
    }
}
