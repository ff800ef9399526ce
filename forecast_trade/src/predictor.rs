//! Request-scoped forecasting entry point
//!
//! The predictor owns no model state. Every call fetches the history its
//! strategy needs, builds the strategy, runs it and returns the result.

use crate::cache::{CacheKey, ForecastCache};
use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use crate::models::{CancelFlag, SequenceModelConfig};
use crate::provider::MarketDataProvider;
use crate::strategies::{
    ForecastStrategy, MeanReversionStrategy, NaiveDeltaStrategy, PredictionResult,
    SequenceModelStrategy, StrategyKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How much history each strategy is given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Days fetched for the sequence-model and naive strategies
    pub forecast_history_days: usize,
    /// Trailing closes compared by the mean reversion strategy
    pub mean_reversion_window: usize,
    /// LSTM hyper-parameters
    pub sequence: SequenceModelConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            forecast_history_days: 60,
            mean_reversion_window: 10,
            sequence: SequenceModelConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<()> {
        self.sequence.validate()?;
        if self.mean_reversion_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Mean reversion window must be positive".to_string(),
            ));
        }
        if self.forecast_history_days <= self.sequence.window_size {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast history ({} days) must exceed the model window ({})",
                self.forecast_history_days, self.sequence.window_size
            )));
        }
        Ok(())
    }
}

/// Orchestrates provider, strategy and optional cache
pub struct Predictor {
    provider: Arc<dyn MarketDataProvider>,
    config: PredictorConfig,
    cache: Option<Arc<ForecastCache>>,
}

impl Predictor {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: PredictorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            cache: None,
        })
    }

    /// Reuse sequence-model results through `cache`
    pub fn with_cache(mut self, cache: Arc<ForecastCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Build the strategy for `kind`
    pub fn strategy(
        &self,
        kind: StrategyKind,
        cancel: &CancelFlag,
    ) -> Result<Box<dyn ForecastStrategy>> {
        Ok(match kind {
            StrategyKind::SequenceModel => Box::new(
                SequenceModelStrategy::new(self.config.sequence.clone())?
                    .with_cancel(cancel.clone()),
            ),
            StrategyKind::NaiveDelta => Box::new(NaiveDeltaStrategy::new()),
            StrategyKind::MeanReversion => {
                Box::new(MeanReversionStrategy::new(self.config.mean_reversion_window)?)
            }
        })
    }

    /// Default days of history requested from the provider for `kind`
    pub fn history_days(&self, kind: StrategyKind) -> usize {
        match kind {
            StrategyKind::SequenceModel | StrategyKind::NaiveDelta => {
                self.config.forecast_history_days
            }
            StrategyKind::MeanReversion => self.config.mean_reversion_window,
        }
    }

    /// Days to fetch for `kind`, honouring a per-request `days` override
    ///
    /// An override must be positive, and for the sequence model it must exceed
    /// the model window.
    pub fn lookback(&self, kind: StrategyKind, days: Option<usize>) -> Result<usize> {
        let Some(days) = days else {
            return Ok(self.history_days(kind));
        };
        if days == 0 {
            return Err(ForecastError::InvalidParameter(
                "History window must be positive".to_string(),
            ));
        }
        let window = self.config.sequence.window_size;
        if kind == StrategyKind::SequenceModel && days <= window {
            return Err(ForecastError::InvalidParameter(format!(
                "History window of {} days must exceed the model window ({})",
                days, window
            )));
        }
        Ok(days)
    }

    /// Fetch the history `kind` needs; `days` overrides the configured lookback
    pub fn fetch_history(
        &self,
        symbol: &str,
        kind: StrategyKind,
        days: Option<usize>,
    ) -> Result<PriceHistory> {
        let days = self.lookback(kind, days)?;
        debug!(symbol, days, strategy = %kind, "fetching history");
        self.provider.fetch_close_series(symbol, days)
    }

    /// Fetch and estimate in one call
    pub fn predict(
        &self,
        symbol: &str,
        kind: StrategyKind,
        days: Option<usize>,
    ) -> Result<PredictionResult> {
        let history = self.fetch_history(symbol, kind, days)?;
        self.predict_history(&history, kind, &CancelFlag::default())
    }

    /// Estimate from an already fetched history
    pub fn predict_history(
        &self,
        history: &PriceHistory,
        kind: StrategyKind,
        cancel: &CancelFlag,
    ) -> Result<PredictionResult> {
        let strategy = self.strategy(kind, cancel)?;

        match (&self.cache, kind) {
            (Some(cache), StrategyKind::SequenceModel) => {
                let key = CacheKey::new(history, &self.config.sequence);
                cache.get_or_compute(&key, || strategy.estimate(history))
            }
            _ => strategy.estimate(history),
        }
    }
}
