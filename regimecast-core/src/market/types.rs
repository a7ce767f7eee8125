use std::fmt;

use serde::{Deserialize, Serialize};

use super::MarketRegime;

/// Uppercase ticker used as the join key for every upstream call in one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Spot pair quoted against USDT, e.g. `BTC/USDT`
    pub fn usdt_pair(&self) -> String {
        format!("{}/USDT", self.0)
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// USD spot price for a symbol. Always positive and finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub price_usd: f64,
}

/// Relative strength index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rsi {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    #[serde(rename = "valueMACD")]
    pub value: f64,
    #[serde(rename = "valueMACDSignal")]
    pub signal: f64,
    #[serde(rename = "valueMACDHist")]
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    #[serde(rename = "valueUpperBand")]
    pub upper: f64,
    #[serde(rename = "valueMiddleBand")]
    pub middle: f64,
    #[serde(rename = "valueLowerBand")]
    pub lower: f64,
}

/// Average true range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atr {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stochastic {
    #[serde(rename = "valueK")]
    pub k: f64,
    #[serde(rename = "valueD")]
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub value: f64,
    pub period: u32,
}

/// Every indicator the classifier needs, fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Rsi,
    pub macd: Macd,
    pub bb: BollingerBands,
    pub atr: Atr,
    pub stoch: Stochastic,
    pub sma: MovingAverage,
    pub ema: MovingAverage,
}

/// Classified regime plus the inputs it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub regime: MarketRegime,
    pub current_price: PriceQuote,
    pub indicators: IndicatorSnapshot,
}
