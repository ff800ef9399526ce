//! Last-change extrapolation

use crate::data::PriceHistory;
use crate::error::Result;
use crate::strategies::{ForecastStrategy, PredictionResult, StrategyKind};

/// Repeats the most recent change once: `last + (last - previous)`
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveDeltaStrategy;

impl NaiveDeltaStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastStrategy for NaiveDeltaStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NaiveDelta
    }

    fn min_history(&self) -> usize {
        2
    }

    fn estimate(&self, history: &PriceHistory) -> Result<PredictionResult> {
        history.ensure_len(self.min_history())?;

        let closes = history.closes();
        let last = closes[closes.len() - 1];
        let delta = last - closes[closes.len() - 2];

        Ok(PredictionResult::estimate(
            history.symbol(),
            last + delta,
            self.kind(),
            format!("Extrapolates the last change of {:+.2}", delta),
        ))
    }
}
