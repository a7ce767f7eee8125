//! Prompt construction for regime classification

use crate::market::{IndicatorSnapshot, MarketRegime, PriceQuote};

pub const SYSTEM_PROMPT: &str = "You are a cryptocurrency market analyst. \
Analyze the technical indicators to classify if the market is in a trending or ranging regime. \
Reply with exactly one of the allowed labels and nothing else.";

/// User prompt embedding the price and every indicator field verbatim.
pub fn regime_prompt(quote: &PriceQuote, indicators: &IndicatorSnapshot) -> String {
    let labels = MarketRegime::ALL
        .iter()
        .map(|regime| regime.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Classify the market regime based on these technical indicators for {symbol}:\n\
         - Current Price: ${price}\n\
         - RSI: {rsi}\n\
         - MACD: {macd} (Signal: {signal}, Hist: {hist})\n\
         - Bollinger Bands: Upper: {upper}, Middle: {middle}, Lower: {lower}\n\
         - ATR: {atr}\n\
         - Stochastic: K: {k}, D: {d}\n\
         - SMA({sma_period}): {sma}\n\
         - EMA({ema_period}): {ema}\n\n\
         Allowed labels: {labels}",
        symbol = quote.symbol,
        price = quote.price_usd,
        rsi = indicators.rsi.value,
        macd = indicators.macd.value,
        signal = indicators.macd.signal,
        hist = indicators.macd.histogram,
        upper = indicators.bb.upper,
        middle = indicators.bb.middle,
        lower = indicators.bb.lower,
        atr = indicators.atr.value,
        k = indicators.stoch.k,
        d = indicators.stoch.d,
        sma_period = indicators.sma.period,
        sma = indicators.sma.value,
        ema_period = indicators.ema.period,
        ema = indicators.ema.value,
    )
}
