//! Trailing-mean comparison
//!
//! Cheaper than a forecast and directional only: a close above its trailing
//! mean suggests buying, anything else suggests waiting.

use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use crate::signals::{mean_close, SignalAggregator, Suggestion};
use crate::strategies::{ForecastStrategy, PredictionResult, StrategyKind};

/// Mean reversion heuristic over the last `window` closes
#[derive(Debug, Clone, Copy)]
pub struct MeanReversionStrategy {
    window: usize,
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl MeanReversionStrategy {
    /// Create a mean reversion strategy over `window` trailing closes
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Mean reversion window must be positive".to_string(),
            ));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl ForecastStrategy for MeanReversionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn min_history(&self) -> usize {
        1
    }

    fn estimate(&self, history: &PriceHistory) -> Result<PredictionResult> {
        let recent = history.tail(self.window);
        let mean = mean_close(&recent);
        let latest = recent.latest();
        let signal = SignalAggregator::suggestion(&recent);

        let relation = match signal {
            Suggestion::Buy => "above",
            Suggestion::Avoid => "at or below",
        };

        Ok(PredictionResult::directional(
            history.symbol(),
            signal,
            self.kind(),
            format!(
                "Latest close {:.2} is {} the {}-point mean of {:.2}",
                latest,
                relation,
                recent.len(),
                mean
            ),
        ))
    }
}
