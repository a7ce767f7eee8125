//! MCP wrapper for the spot price lookup

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{SymbolArgs, symbol_schema};
use crate::Result;
use crate::feeds::PriceSource;
use crate::market::Symbol;
use crate::mcp::{McpTool, McpToolResult};

/// `get_crypto_price`: current USD price for a symbol
pub struct McpCryptoPriceTool {
    prices: Arc<dyn PriceSource>,
}

impl McpCryptoPriceTool {
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl McpTool for McpCryptoPriceTool {
    fn name(&self) -> &str {
        "get_crypto_price"
    }

    fn description(&self) -> &str {
        "Get the current price of a cryptocurrency"
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }

    async fn execute(&self, arguments: Value) -> Result<McpToolResult> {
        let args = SymbolArgs::parse(self.name(), arguments)?;
        debug!(symbol = %args.symbol, "get_crypto_price");

        match self.prices.quote(&Symbol::new(&args.symbol)).await {
            Ok(quote) => Ok(McpToolResult::text(format!(
                "Current price of {}: ${}",
                args.symbol, quote.price_usd
            ))),
            Err(e) => Ok(McpToolResult::error(format!("Error fetching price: {e}"))),
        }
    }
}
