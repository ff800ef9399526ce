//! Trend and buy/avoid signals, independent of any trained model

use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use crate::provider::MarketDataProvider;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use trade_math::round2;

/// Direction of the price change over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    /// The rounded change is exactly zero
    Flat,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Up => "UP",
            TrendDirection::Down => "DOWN",
            TrendDirection::Flat => "FLAT",
        };
        f.write_str(label)
    }
}

/// Buy/avoid heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suggestion {
    Buy,
    Avoid,
}

/// Change between the first and last close of a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub symbol: String,
    /// `last - first`, rounded to cents
    pub period_delta: f64,
    pub direction: TrendDirection,
}

/// Current price, trend and suggestion for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub symbol: String,
    pub current_price: f64,
    pub trend: TrendReport,
    pub suggestion: Suggestion,
}

/// Lookback periods used when the aggregator fetches its own data
///
/// Both are passed to [`MarketDataProvider::fetch_close_series`] as
/// `period_days`, so their unit is whatever the provider counts: calendar days
/// for the HTTP provider (7 days is about 5 trading closes), trailing points
/// for the in-memory one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Calendar days for HTTP data; a 7-day Yahoo range gives about 5 closes
    pub trend_days: usize,
    pub suggestion_days: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            trend_days: 7,
            suggestion_days: 10,
        }
    }
}

/// Combines current price, trend and suggestion into one report
pub struct SignalAggregator {
    provider: Arc<dyn MarketDataProvider>,
    config: SignalConfig,
}

impl SignalAggregator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: SignalConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Trend over the whole of `history`
    ///
    /// Needs two points. The direction is decided on the delta *after*
    /// [`round2`], so a change smaller than half a cent (e.g. `100.0` to
    /// `100.004`) is reported as [`TrendDirection::Flat`].
    pub fn trend(history: &PriceHistory) -> Result<TrendReport> {
        history.ensure_len(2)?;

        let period_delta = round2(history.latest() - history.first());
        let direction = if period_delta > 0.0 {
            TrendDirection::Up
        } else if period_delta < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        };

        Ok(TrendReport {
            symbol: history.symbol().to_string(),
            period_delta,
            direction,
        })
    }

    /// `Buy` iff the latest close is strictly above the mean of `history`
    pub fn suggestion(history: &PriceHistory) -> Suggestion {
        if history.latest() > mean_close(history) {
            Suggestion::Buy
        } else {
            Suggestion::Avoid
        }
    }

    /// Latest close rounded to cents
    pub fn current_price(history: &PriceHistory) -> f64 {
        round2(history.latest())
    }

    /// Fetch the trend period and compute its trend
    ///
    /// `days` overrides [`SignalConfig::trend_days`] for this call.
    pub fn fetch_trend(&self, symbol: &str, days: Option<usize>) -> Result<TrendReport> {
        let days = lookback(days, self.config.trend_days)?;
        let history = self.provider.fetch_close_series(symbol, days)?;
        Self::trend(&history)
    }

    /// Fetch the suggestion period and compute its suggestion
    ///
    /// `days` overrides [`SignalConfig::suggestion_days`] for this call.
    pub fn fetch_suggestion(&self, symbol: &str, days: Option<usize>) -> Result<Suggestion> {
        let days = lookback(days, self.config.suggestion_days)?;
        let history = self.provider.fetch_close_series(symbol, days)?;
        Ok(Self::suggestion(&history))
    }

    /// Spot price from the provider, rounded to cents
    pub fn fetch_current_price(&self, symbol: &str) -> Result<f64> {
        Ok(round2(self.provider.fetch_spot_price(symbol)?))
    }

    /// Everything at once
    pub fn aggregate(&self, symbol: &str) -> Result<SignalReport> {
        let current_price = self.fetch_current_price(symbol)?;
        let trend = self.fetch_trend(symbol, None)?;
        let suggestion = self.fetch_suggestion(symbol, None)?;

        debug!(symbol = %trend.symbol, ?suggestion, delta = trend.period_delta, "signals aggregated");

        Ok(SignalReport {
            symbol: trend.symbol.clone(),
            current_price,
            trend,
            suggestion,
        })
    }
}

fn lookback(days: Option<usize>, default: usize) -> Result<usize> {
    match days {
        Some(0) => Err(ForecastError::InvalidParameter(
            "History window must be positive".to_string(),
        )),
        Some(days) => Ok(days),
        None => Ok(default),
    }
}

/// Arithmetic mean of every close in `history`
pub fn mean_close(history: &PriceHistory) -> f64 {
    history.closes().mean()
}
