//! Environment configuration
//!
//! Every setting has a default and can be overridden by an `OWL_*` variable.
//! The binary loads a `.env` file first, so the same names work there.

use crate::error::{BotError, Result};
use forecast_trade::{PredictorConfig, SequenceModelConfig, SignalConfig};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub predictor: PredictorConfig,
    pub signals: SignalConfig,
    /// Wall-clock cap on one sequence-model run
    pub forecast_timeout: Duration,
    /// Lifetime of cached sequence-model forecasts, `None` disables the cache
    pub cache_ttl: Option<Duration>,
    pub http_timeout: Duration,
    pub coingecko_url: String,
    pub yahoo_url: String,
    /// RSS feed URL; `{symbol}` is replaced by the ticker
    pub news_feed_url: Option<String>,
    pub news_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            predictor: PredictorConfig::default(),
            signals: SignalConfig::default(),
            forecast_timeout: Duration::from_secs(20),
            cache_ttl: None,
            http_timeout: Duration::from_secs(10),
            coingecko_url: DEFAULT_COINGECKO_URL.to_string(),
            yahoo_url: DEFAULT_YAHOO_URL.to_string(),
            news_feed_url: None,
            news_limit: 3,
        }
    }
}

impl BotConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let seq = &defaults.predictor.sequence;

        let sequence = SequenceModelConfig {
            window_size: parse_var(&lookup, "OWL_WINDOW_SIZE", seq.window_size)?,
            hidden_size: parse_var(&lookup, "OWL_HIDDEN_SIZE", seq.hidden_size)?,
            epochs: parse_var(&lookup, "OWL_EPOCHS", seq.epochs)?,
            learning_rate: parse_var(&lookup, "OWL_LEARNING_RATE", seq.learning_rate)?,
            gradient_clip: seq.gradient_clip,
            seed: parse_var(&lookup, "OWL_SEED", seq.seed)?,
        };

        let predictor = PredictorConfig {
            forecast_history_days: parse_var(
                &lookup,
                "OWL_FORECAST_DAYS",
                defaults.predictor.forecast_history_days,
            )?,
            mean_reversion_window: parse_var(
                &lookup,
                "OWL_SUGGEST_DAYS",
                defaults.predictor.mean_reversion_window,
            )?,
            sequence,
        };
        predictor
            .validate()
            .map_err(|e| BotError::Config(e.to_string()))?;

        let signals = SignalConfig {
            trend_days: parse_var(&lookup, "OWL_TREND_DAYS", defaults.signals.trend_days)?,
            suggestion_days: predictor.mean_reversion_window,
        };

        let timeout_secs = parse_var(
            &lookup,
            "OWL_FORECAST_TIMEOUT_SECS",
            defaults.forecast_timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(BotError::Config(
                "OWL_FORECAST_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        let cache_secs: u64 = parse_var(&lookup, "OWL_CACHE_TTL_SECS", 0)?;

        Ok(Self {
            predictor,
            signals,
            forecast_timeout: Duration::from_secs(timeout_secs),
            cache_ttl: (cache_secs > 0).then(|| Duration::from_secs(cache_secs)),
            http_timeout: Duration::from_secs(parse_var(
                &lookup,
                "OWL_HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )?),
            coingecko_url: lookup("OWL_COINGECKO_URL").unwrap_or(defaults.coingecko_url),
            yahoo_url: lookup("OWL_YAHOO_URL").unwrap_or(defaults.yahoo_url),
            news_feed_url: lookup("OWL_NEWS_FEED_URL").filter(|url| !url.trim().is_empty()),
            news_limit: parse_var(&lookup, "OWL_NEWS_LIMIT", defaults.news_limit)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| BotError::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
