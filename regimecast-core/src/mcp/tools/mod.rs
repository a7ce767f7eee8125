//! MCP tool wrappers for the market pipelines

mod price;
mod regime;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

pub use price::McpCryptoPriceTool;
pub use regime::McpMarketRegimeTool;

#[derive(Debug, Deserialize)]
struct SymbolArgs {
    symbol: String,
}

impl SymbolArgs {
    fn parse(tool: &str, arguments: Value) -> Result<Self> {
        let args: Self = serde_json::from_value(arguments)
            .map_err(|e| Error::InvalidParams(format!("Invalid {tool} arguments: {e}")))?;
        if args.symbol.trim().is_empty() {
            return Err(Error::InvalidParams(format!(
                "Invalid {tool} arguments: symbol must not be empty"
            )));
        }
        Ok(args)
    }
}

fn symbol_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "The cryptocurrency symbol (e.g., BTC, ETH)"
            }
        },
        "required": ["symbol"]
    })
}
