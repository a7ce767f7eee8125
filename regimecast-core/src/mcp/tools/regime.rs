//! MCP wrapper for market regime classification

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{SymbolArgs, symbol_schema};
use crate::Result;
use crate::analysis::RegimeClassifier;
use crate::mcp::{McpTool, McpToolResult};

/// `analyze_market_regime`: indicators, price and the classified regime
pub struct McpMarketRegimeTool {
    classifier: Arc<RegimeClassifier>,
}

impl McpMarketRegimeTool {
    pub fn new(classifier: Arc<RegimeClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl McpTool for McpMarketRegimeTool {
    fn name(&self) -> &str {
        "analyze_market_regime"
    }

    fn description(&self) -> &str {
        "Analyze the market regime (Trending Up, Trending Down, Ranging) for a cryptocurrency \
         using technical indicators"
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }

    async fn execute(&self, arguments: Value) -> Result<McpToolResult> {
        let args = SymbolArgs::parse(self.name(), arguments)?;
        debug!(symbol = %args.symbol, "analyze_market_regime");

        match self.classifier.classify(&args.symbol).await {
            Ok(analysis) => Ok(McpToolResult::text(format!(
                "Technical indicators for {}:\n{}",
                args.symbol,
                serde_json::to_string_pretty(&analysis)?
            ))),
            Err(e) => Ok(McpToolResult::error(format!(
                "Error fetching technical indicators: {e}"
            ))),
        }
    }
}
