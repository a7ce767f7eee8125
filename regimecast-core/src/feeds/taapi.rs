//! TAAPI bulk indicator fetch
//!
//! All seven indicators are requested in one `POST /bulk`. The response is a
//! flat list of `{id, result, errors}` entries; a single errored entry fails
//! the whole fetch so the classifier never sees a partial snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FeedsConfig;
use crate::market::{
    Atr, BollingerBands, IndicatorSnapshot, Macd, MovingAverage, Rsi, Stochastic, Symbol,
};
use crate::{Error, Result};

use super::{IndicatorSource, http_client};

const STOCH_K_PERIOD: u32 = 14;
const STOCH_D_PERIOD: u32 = 3;
const MOVING_AVERAGE_PERIOD: u32 = 20;

/// One indicator computation inside a bulk construct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorQuery {
    pub id: &'static str,
    pub indicator: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k_period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d_period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
}

impl IndicatorQuery {
    const fn plain(id: &'static str, indicator: &'static str) -> Self {
        Self {
            id,
            indicator,
            k_period: None,
            d_period: None,
            period: None,
        }
    }

    const fn with_period(id: &'static str, indicator: &'static str, period: u32) -> Self {
        Self {
            id,
            indicator,
            k_period: None,
            d_period: None,
            period: Some(period),
        }
    }
}

/// The fixed set of indicators behind an [`IndicatorSnapshot`]
pub fn bulk_queries() -> Vec<IndicatorQuery> {
    vec![
        IndicatorQuery::plain("rsi", "rsi"),
        IndicatorQuery::plain("macd", "macd"),
        IndicatorQuery::plain("bb", "bbands"),
        IndicatorQuery::plain("atr", "atr"),
        IndicatorQuery {
            k_period: Some(STOCH_K_PERIOD),
            d_period: Some(STOCH_D_PERIOD),
            ..IndicatorQuery::plain("stoch", "stoch")
        },
        IndicatorQuery::with_period("sma", "sma", MOVING_AVERAGE_PERIOD),
        IndicatorQuery::with_period("ema", "ema", MOVING_AVERAGE_PERIOD),
    ]
}

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    secret: &'a str,
    construct: Construct<'a>,
}

#[derive(Debug, Serialize)]
struct Construct<'a> {
    exchange: &'a str,
    symbol: String,
    interval: &'a str,
    indicators: Vec<IndicatorQuery>,
}

/// Raw bulk response. May describe a partial result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub data: Vec<BulkEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkEntry {
    pub id: String,
    #[serde(default)]
    pub result: Value,
    /// Upstream sends `[]`, `null` or omits the field when the indicator succeeded
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl BulkEntry {
    pub fn errors(&self) -> &[Value] {
        self.errors.as_deref().unwrap_or_default()
    }

    fn error_messages(&self) -> String {
        self.errors()
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Reshape a bulk response into a snapshot, failing if any indicator errored.
pub fn snapshot_from_bulk(
    response: &BulkResponse,
) -> std::result::Result<IndicatorSnapshot, String> {
    let results: HashMap<&str, &Value> = response
        .data
        .iter()
        .map(|entry| (entry.id.as_str(), &entry.result))
        .collect();

    let errors: Vec<String> = response
        .data
        .iter()
        .filter(|entry| !entry.errors().is_empty())
        .map(|entry| format!("{}: {}", entry.id, entry.error_messages()))
        .collect();

    if !errors.is_empty() {
        return Err(format!("Indicator errors: {}", errors.join("; ")));
    }

    let field = |id: &str, name: &str| -> std::result::Result<f64, String> {
        let result = results
            .get(id)
            .filter(|value| !value.is_null())
            .ok_or_else(|| format!("Missing indicator result: {id}"))?;
        result
            .get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("Indicator {id} missing field {name}"))
    };

    Ok(IndicatorSnapshot {
        rsi: Rsi {
            value: field("rsi", "value")?,
        },
        macd: Macd {
            value: field("macd", "valueMACD")?,
            signal: field("macd", "valueMACDSignal")?,
            histogram: field("macd", "valueMACDHist")?,
        },
        bb: BollingerBands {
            upper: field("bb", "valueUpperBand")?,
            middle: field("bb", "valueMiddleBand")?,
            lower: field("bb", "valueLowerBand")?,
        },
        atr: Atr {
            value: field("atr", "value")?,
        },
        stoch: Stochastic {
            k: field("stoch", "valueK")?,
            d: field("stoch", "valueD")?,
        },
        sma: MovingAverage {
            value: field("sma", "value")?,
            period: MOVING_AVERAGE_PERIOD,
        },
        ema: MovingAverage {
            value: field("ema", "value")?,
            period: MOVING_AVERAGE_PERIOD,
        },
    })
}

/// TAAPI.IO client
pub struct TaapiClient {
    http: reqwest::Client,
    base_url: String,
    secret: Option<String>,
    exchange: String,
    interval: String,
}

impl TaapiClient {
    pub fn new(config: &FeedsConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            base_url: config.taapi_base_url.trim_end_matches('/').to_string(),
            secret: config.taapi_api_key.clone(),
            exchange: config.exchange.clone(),
            interval: config.interval.clone(),
        })
    }

    async fn request(&self, symbol: &Symbol) -> std::result::Result<BulkResponse, String> {
        let body = BulkRequest {
            secret: self.secret.as_deref().unwrap_or_default(),
            construct: Construct {
                exchange: &self.exchange,
                symbol: symbol.usdt_pair(),
                interval: &self.interval,
                indicators: bulk_queries(),
            },
        };

        let response = self
            .http
            .post(format!("{}/bulk", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(if detail.is_empty() {
                format!("Request failed with status code {}", status.as_u16())
            } else {
                format!(
                    "Request failed with status code {}: {}",
                    status.as_u16(),
                    detail.trim()
                )
            });
        }

        response
            .json::<BulkResponse>()
            .await
            .map_err(|e| format!("Invalid bulk response: {e}"))
    }
}

#[async_trait]
impl IndicatorSource for TaapiClient {
    async fn fetch(&self, symbol: &Symbol) -> Result<IndicatorSnapshot> {
        debug!(
            %symbol,
            exchange = %self.exchange,
            interval = %self.interval,
            "Fetching bulk indicators"
        );
        let response = self.request(symbol).await.map_err(Error::Indicators)?;
        snapshot_from_bulk(&response).map_err(|message| {
            warn!(%symbol, %message, "Rejecting indicator response");
            Error::Indicators(message)
        })
    }
}
