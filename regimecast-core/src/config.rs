//! Configuration types for the regimecast server

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// LLM provider selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    OpenAi,
    Anthropic,
    LiteLlm,
}

impl ProviderName {
    /// Environment variable holding this provider's API key
    pub fn env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::LiteLlm => "LITELLM_API_KEY",
        }
    }

    /// Model used when the config names none
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi | Self::LiteLlm => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

/// Listener configuration for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream market data feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default)]
    pub coinmarketcap_api_key: Option<String>,
    #[serde(default = "default_coinmarketcap_base_url")]
    pub coinmarketcap_base_url: String,
    #[serde(default)]
    pub taapi_api_key: Option<String>,
    #[serde(default = "default_taapi_base_url")]
    pub taapi_base_url: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Per-request timeout for upstream calls. Unset means the HTTP client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_coinmarketcap_base_url() -> String {
    "https://pro-api.coinmarketcap.com".to_string()
}

fn default_taapi_base_url() -> String {
    "https://api.taapi.io".to_string()
}

fn default_exchange() -> String {
    "binance".to_string()
}

fn default_interval() -> String {
    "1h".to_string()
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            coinmarketcap_api_key: None,
            coinmarketcap_base_url: default_coinmarketcap_base_url(),
            taapi_api_key: None,
            taapi_base_url: default_taapi_base_url(),
            exchange: default_exchange(),
            interval: default_interval(),
            timeout_secs: None,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub name: ProviderName,
    /// Falls back to the provider's default model when unset
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Model identifier requests are sent to
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.name.default_model())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::OpenAi,
            model: None,
            api_key: None,
            base_url: None,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration with cascade:
    /// 1. explicit path (must exist)
    /// 2. ./regimecast.toml
    /// 3. ~/.regimecast/config.toml
    /// 4. built-in defaults
    ///
    /// A file that exists but fails to parse is an error, not a fallthrough.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = Path::new("regimecast.toml");
        if local.exists() {
            return Self::from_file(local);
        }

        if let Some(global) = Self::global_config_path()
            && global.exists()
        {
            return Self::from_file(global);
        }

        Ok(Self::default())
    }

    /// Load, expand `${VAR}` placeholders and apply the process environment.
    pub fn load_from_env(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load(explicit)?;
        let lookup = |name: &str| std::env::var(name).ok();
        config.expand_env_vars_with(lookup);
        config.apply_env_overrides_with(lookup)?;
        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".regimecast").join("config.toml"))
    }

    /// Replace `${VAR}` values in credential fields. Unresolved placeholders become `None`.
    pub fn expand_env_vars_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        expand_placeholder(&mut self.feeds.coinmarketcap_api_key, &lookup);
        expand_placeholder(&mut self.feeds.taapi_api_key, &lookup);
        expand_placeholder(&mut self.provider.api_key, &lookup);
    }

    /// Overlay well-known environment variables on top of file values.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(key) = lookup("COINMARKETCAP_API_KEY") {
            self.feeds.coinmarketcap_api_key = Some(key);
        }
        if let Some(key) = lookup("TAAPI_API_KEY") {
            self.feeds.taapi_api_key = Some(key);
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.provider.model = Some(model);
        }
        if self.provider.api_key.is_none() {
            self.provider.api_key = lookup(self.provider.name.env_var());
        }
        Ok(())
    }

    /// Names of credentials that are not configured
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.feeds.coinmarketcap_api_key.is_none() {
            missing.push("COINMARKETCAP_API_KEY");
        }
        if self.feeds.taapi_api_key.is_none() {
            missing.push("TAAPI_API_KEY");
        }
        if self.provider.api_key.is_none() {
            missing.push(self.provider.name.env_var());
        }
        missing
    }

    /// Resolve the HTTP listen address. Accepts IP literals (IPv6 with or
    /// without brackets) and hostnames; the first resolved address wins.
    pub async fn listen_addr(&self) -> Result<SocketAddr> {
        let host = self.server.host.trim_start_matches('[').trim_end_matches(']');
        let port = self.server.port;
        let invalid = |detail: String| {
            Error::Config(format!("Invalid listen address {host}:{port}: {detail}"))
        };

        tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }
}

fn expand_placeholder<F>(value: &mut Option<String>, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let Some(current) = value.as_deref() else {
        return;
    };
    if let Some(var_name) = current
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        *value = lookup(var_name);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.feeds.exchange, "binance");
        assert_eq!(config.feeds.interval, "1h");
        assert_eq!(config.feeds.timeout_secs, None);
        assert_eq!(config.provider.name, ProviderName::OpenAi);
        assert_eq!(config.provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_parse_provider_only_config() {
        let toml = r#"
[provider]
name = "anthropic"
model = "claude-sonnet-4-20250514"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.provider.name, ProviderName::Anthropic);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.feeds.taapi_base_url, "https://api.taapi.io");
    }

    #[tokio::test]
    async fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[feeds]
coinmarketcap_api_key = "cmc"
taapi_api_key = "taapi"
exchange = "bybit"
interval = "4h"
timeout_secs = 15

[provider]
name = "litellm"
model = "gpt-4o-mini"
base_url = "http://localhost:4000"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(
            config.listen_addr().await.unwrap().to_string(),
            "127.0.0.1:8080"
        );
        assert_eq!(config.feeds.exchange, "bybit");
        assert_eq!(config.feeds.timeout_secs, Some(15));
        assert_eq!(config.provider.name, ProviderName::LiteLlm);
        assert!(config.missing_credentials().contains(&"LITELLM_API_KEY"));
    }

    #[test]
    fn test_default_model_follows_provider() {
        let config = Config::parse("[provider]\nname = \"anthropic\"\n").unwrap();
        assert_eq!(config.provider.model(), "claude-3-5-haiku-latest");

        let config = Config::parse("[provider]\nname = \"litellm\"\n").unwrap();
        assert_eq!(config.provider.model(), "gpt-4o-mini");

        let mut config = Config::parse("[provider]\nname = \"anthropic\"\n").unwrap();
        config
            .apply_env_overrides_with(env(&[("LLM_MODEL", "claude-sonnet-4-20250514")]))
            .unwrap();
        assert_eq!(config.provider.model(), "claude-sonnet-4-20250514");
    }

    #[tokio::test]
    async fn test_listen_addr_accepts_hostnames_and_ipv6() {
        let mut config = Config::default();
        config.server.port = 3000;

        config.server.host = "localhost".to_string();
        let addr = config.listen_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3000);

        config.server.host = "::1".to_string();
        assert_eq!(config.listen_addr().await.unwrap().to_string(), "[::1]:3000");

        config.server.host = "[::1]".to_string();
        assert_eq!(config.listen_addr().await.unwrap().to_string(), "[::1]:3000");

        config.server.host = "0.0.0.0".to_string();
        assert_eq!(config.listen_addr().await.unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("[server\nport = ").is_err());
    }

    #[test]
    fn test_env_var_expansion() {
        let toml = r#"
[feeds]
coinmarketcap_api_key = "${CMC_KEY}"
taapi_api_key = "${UNSET_KEY}"
"#;
        let mut config = Config::parse(toml).unwrap();
        config.expand_env_vars_with(env(&[("CMC_KEY", "expanded")]));
        assert_eq!(
            config.feeds.coinmarketcap_api_key,
            Some("expanded".to_string())
        );
        assert_eq!(config.feeds.taapi_api_key, None);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides_with(env(&[
                ("PORT", "4100"),
                ("COINMARKETCAP_API_KEY", "cmc"),
                ("TAAPI_API_KEY", "taapi"),
                ("OPENAI_API_KEY", "sk-test"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.provider.api_key, Some("sk-test".to_string()));
        assert!(config.missing_credentials().is_empty());
    }

    #[test]
    fn test_file_api_key_wins_over_env() {
        let mut config = Config::default();
        config.provider.api_key = Some("from-file".to_string());
        config
            .apply_env_overrides_with(env(&[("OPENAI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(config.provider.api_key, Some("from-file".to_string()));
    }

    #[test]
    fn test_bad_port_is_fatal() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides_with(env(&[("PORT", "not-a-port")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_global_config_path() {
        let path = Config::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().ends_with(".regimecast/config.toml"));
    }
}
