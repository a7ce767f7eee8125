//! Market domain types shared by the feeds, the classifier and the MCP tools

mod regime;
mod types;

pub use regime::MarketRegime;
pub use types::{
    Atr, BollingerBands, IndicatorSnapshot, Macd, MarketAnalysis, MovingAverage, PriceQuote, Rsi,
    Stochastic, Symbol,
};
