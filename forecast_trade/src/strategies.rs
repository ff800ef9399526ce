//! Interchangeable next-value estimators
//!
//! Every strategy turns a [`PriceHistory`] into the same [`PredictionResult`]
//! shape. Strategies hold no state between calls, so one failing never affects
//! another run for the same symbol.

use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use crate::signals::Suggestion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use trade_math::round2;

pub mod mean_reversion;
pub mod naive_delta;
pub mod sequence;

pub use mean_reversion::MeanReversionStrategy;
pub use naive_delta::NaiveDeltaStrategy;
pub use sequence::SequenceModelStrategy;

/// Selector for the estimation algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Windowed LSTM trained on the request's history
    SequenceModel,
    /// `last + (last - previous)`
    NaiveDelta,
    /// Latest close against its trailing mean; directional only
    MeanReversion,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::SequenceModel,
        StrategyKind::NaiveDelta,
        StrategyKind::MeanReversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::SequenceModel => "sequence-model",
            StrategyKind::NaiveDelta => "naive-delta",
            StrategyKind::MeanReversion => "mean-reversion",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequence-model" | "sequence" | "lstm" | "ai" => Ok(StrategyKind::SequenceModel),
            "naive-delta" | "naive" | "delta" => Ok(StrategyKind::NaiveDelta),
            "mean-reversion" | "reversion" | "suggest" => Ok(StrategyKind::MeanReversion),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown strategy '{}' (expected lstm, naive or mean-reversion)",
                other
            ))),
        }
    }
}

/// Outcome of one estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub(crate) symbol: String,
    pub(crate) estimated_next_value: Option<f64>,
    pub(crate) strategy_used: StrategyKind,
    pub(crate) confidence_note: String,
    pub(crate) signal: Option<Suggestion>,
}

impl PredictionResult {
    /// A numeric estimate, rounded to cents
    pub fn estimate(
        symbol: impl Into<String>,
        value: f64,
        strategy: StrategyKind,
        note: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            estimated_next_value: Some(round2(value)),
            strategy_used: strategy,
            confidence_note: note.into(),
            signal: None,
        }
    }

    /// A directional call without a numeric estimate
    pub fn directional(
        symbol: impl Into<String>,
        signal: Suggestion,
        strategy: StrategyKind,
        note: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            estimated_next_value: None,
            strategy_used: strategy,
            confidence_note: note.into(),
            signal: Some(signal),
        }
    }

    /// Same result with its note replaced
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.confidence_note = note.into();
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Rounded estimate, `None` for directional strategies
    pub fn estimated_next_value(&self) -> Option<f64> {
        self.estimated_next_value
    }

    pub fn strategy_used(&self) -> StrategyKind {
        self.strategy_used
    }

    pub fn confidence_note(&self) -> &str {
        &self.confidence_note
    }

    pub fn signal(&self) -> Option<Suggestion> {
        self.signal
    }

    /// Convert the result to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ForecastError::DataError(e.to_string()))
    }
}

/// Common interface of the estimators
pub trait ForecastStrategy: Send + Sync {
    /// Which algorithm this is
    fn kind(&self) -> StrategyKind;

    /// Fewest points [`estimate`](Self::estimate) accepts
    fn min_history(&self) -> usize;

    /// Produce one estimate from `history`
    fn estimate(&self, history: &PriceHistory) -> Result<PredictionResult>;
}
