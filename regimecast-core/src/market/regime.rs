use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Qualitative market state. Closed set: the classifier may produce nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    #[serde(rename = "Trending Up")]
    TrendingUp,
    #[serde(rename = "Trending Down")]
    TrendingDown,
    #[serde(rename = "Ranging")]
    Ranging,
}

impl MarketRegime {
    pub const ALL: [MarketRegime; 3] = [Self::TrendingUp, Self::TrendingDown, Self::Ranging];

    pub fn label(self) -> &'static str {
        match self {
            Self::TrendingUp => "Trending Up",
            Self::TrendingDown => "Trending Down",
            Self::Ranging => "Ranging",
        }
    }

    /// Validate an untrusted model reply.
    ///
    /// Only surrounding whitespace and one pair of JSON string quotes are
    /// stripped; the rest must match a label exactly.
    pub fn from_model_reply(reply: &str) -> crate::Result<Self> {
        let trimmed = reply.trim();
        let unquoted = match serde_json::from_str::<String>(trimmed) {
            Ok(inner) => inner,
            Err(_) => trimmed.to_string(),
        };
        unquoted
            .parse()
            .map_err(|_| Error::Classification(reply.to_string()))
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MarketRegime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|regime| regime.label() == s)
            .ok_or_else(|| Error::Classification(s.to_string()))
    }
}
