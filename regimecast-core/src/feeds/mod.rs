//! Upstream market data feeds

mod coinmarketcap;
mod taapi;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::FeedsConfig;
use crate::market::{IndicatorSnapshot, PriceQuote, Symbol};
use crate::{Error, Result};

pub use coinmarketcap::{CoinMarketCapClient, QuotesResponse, extract_price};
pub use taapi::{
    BulkEntry, BulkResponse, IndicatorQuery, TaapiClient, bulk_queries, snapshot_from_bulk,
};

/// Source of USD spot prices
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current USD price for `symbol`. Never returns a zero or non-finite price.
    async fn quote(&self, symbol: &Symbol) -> Result<PriceQuote>;
}

/// Source of technical indicator snapshots
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// All indicators for `symbol`, or an error if any single one failed.
    async fn fetch(&self, symbol: &Symbol) -> Result<IndicatorSnapshot>;
}

/// Shared HTTP client for upstream calls. No timeout unless configured.
pub(crate) fn http_client(config: &FeedsConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("regimecast/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}
