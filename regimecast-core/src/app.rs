//! Wiring from configuration to a ready MCP server

use std::sync::Arc;

use tracing::info;

use crate::Result;
use crate::analysis::RegimeClassifier;
use crate::config::Config;
use crate::feeds::{CoinMarketCapClient, IndicatorSource, PriceSource, TaapiClient};
use crate::mcp::McpServer;
use crate::mcp::tools::{McpCryptoPriceTool, McpMarketRegimeTool};
use crate::providers::{LlmProvider, create_provider};

/// Name reported in the MCP `initialize` handshake
pub const SERVER_NAME: &str = "Crypto Analysis MCP";

/// Build the MCP server with live upstream clients from `config`.
pub async fn build_server(config: &Config) -> Result<Arc<McpServer>> {
    let prices: Arc<dyn PriceSource> = Arc::new(CoinMarketCapClient::new(&config.feeds)?);
    let indicators: Arc<dyn IndicatorSource> = Arc::new(TaapiClient::new(&config.feeds)?);
    let provider = create_provider(&config.provider)?;

    info!(
        provider = provider.name(),
        model = provider.model(),
        "Using model provider"
    );

    Ok(build_server_with(prices, indicators, provider).await)
}

/// Build the MCP server around the given sources and model.
pub async fn build_server_with(
    prices: Arc<dyn PriceSource>,
    indicators: Arc<dyn IndicatorSource>,
    provider: Arc<dyn LlmProvider>,
) -> Arc<McpServer> {
    let classifier = Arc::new(RegimeClassifier::new(
        Arc::clone(&prices),
        indicators,
        provider,
    ));

    let server = McpServer::new(SERVER_NAME, env!("CARGO_PKG_VERSION"));
    server
        .register_tool(Arc::new(McpCryptoPriceTool::new(prices)))
        .await;
    server
        .register_tool(Arc::new(McpMarketRegimeTool::new(classifier)))
        .await;

    Arc::new(server)
}
