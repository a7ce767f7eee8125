use std::sync::Arc;

use tracing::{debug, warn};

use crate::feeds::{IndicatorSource, PriceSource};
use crate::market::{MarketAnalysis, MarketRegime, Symbol};
use crate::providers::{CompletionRequest, LlmProvider};
use crate::{Error, Result};

use super::prompt::{SYSTEM_PROMPT, regime_prompt};

/// Enough room for the longest label plus stray whitespace
const MAX_REPLY_TOKENS: u32 = 32;

/// Fetches price and indicators concurrently, then asks the model for a regime.
pub struct RegimeClassifier {
    prices: Arc<dyn PriceSource>,
    indicators: Arc<dyn IndicatorSource>,
    provider: Arc<dyn LlmProvider>,
}

impl RegimeClassifier {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        indicators: Arc<dyn IndicatorSource>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            prices,
            indicators,
            provider,
        }
    }

    /// Classify the current regime for `symbol`.
    ///
    /// Both fetches must succeed; the first failure drops the other branch.
    pub async fn classify(&self, symbol: &str) -> Result<MarketAnalysis> {
        let symbol = Symbol::new(symbol);
        self.run(&symbol).await.map_err(|e| {
            warn!(%symbol, error = %e, "Regime classification failed");
            Error::Analysis(e.to_string())
        })
    }

    async fn run(&self, symbol: &Symbol) -> Result<MarketAnalysis> {
        let (indicators, current_price) =
            tokio::try_join!(self.indicators.fetch(symbol), self.prices.quote(symbol))?;

        let request = CompletionRequest::new(regime_prompt(&current_price, &indicators))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(MAX_REPLY_TOKENS)
            .with_temperature(0.0);

        let response = self.provider.complete(request).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Classification completion finished"
        );
        let reply = response.content.unwrap_or_default();
        let regime = MarketRegime::from_model_reply(&reply)?;

        debug!(%symbol, %regime, model = self.provider.model(), "Classified market regime");

        Ok(MarketAnalysis {
            regime,
            current_price,
            indicators,
        })
    }
}
