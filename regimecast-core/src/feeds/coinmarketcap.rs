//! CoinMarketCap latest-quote lookup

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::FeedsConfig;
use crate::market::{PriceQuote, Symbol};
use crate::{Error, Result};

use super::{PriceSource, http_client};

const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Body of `quotes/latest`, keyed by the requested symbol
#[derive(Debug, Default, Deserialize)]
pub struct QuotesResponse {
    #[serde(default)]
    pub data: HashMap<String, CoinEntry>,
    #[serde(default)]
    pub status: Option<ApiStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CoinEntry {
    #[serde(default)]
    pub quote: HashMap<String, FiatQuote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiatQuote {
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Pull the USD price for `symbol` out of a decoded response.
pub fn extract_price(symbol: &Symbol, response: &QuotesResponse) -> Result<PriceQuote> {
    let price = response
        .data
        .get(symbol.as_str())
        .and_then(|entry| entry.quote.get("USD"))
        .and_then(|usd| usd.price)
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| Error::Price(format!("No price data found for {symbol}")))?;

    Ok(PriceQuote {
        symbol: symbol.clone(),
        price_usd: price,
    })
}

/// CoinMarketCap Pro API client
pub struct CoinMarketCapClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinMarketCapClient {
    pub fn new(config: &FeedsConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            base_url: config.coinmarketcap_base_url.trim_end_matches('/').to_string(),
            api_key: config.coinmarketcap_api_key.clone(),
        })
    }

    async fn request(&self, symbol: &Symbol) -> std::result::Result<QuotesResponse, String> {
        let url = format!("{}{}", self.base_url, QUOTES_PATH);
        let mut request = self.http.get(&url).query(&[("symbol", symbol.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<QuotesResponse>(&body)
                .ok()
                .and_then(|r| r.status)
                .and_then(|s| s.error_message);
            return Err(match detail {
                Some(message) => format!(
                    "Request failed with status code {}: {message}",
                    status.as_u16()
                ),
                None => format!("Request failed with status code {}", status.as_u16()),
            });
        }

        serde_json::from_slice(&body).map_err(|e| format!("Invalid quote response: {e}"))
    }
}

#[async_trait]
impl PriceSource for CoinMarketCapClient {
    async fn quote(&self, symbol: &Symbol) -> Result<PriceQuote> {
        debug!(%symbol, "Fetching CoinMarketCap quote");
        let response = self.request(symbol).await.map_err(Error::Price)?;
        let quote = extract_price(symbol, &response)?;
        debug!(%symbol, price = quote.price_usd, "Received quote");
        Ok(quote)
    }
}
