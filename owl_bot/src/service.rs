//! Async facade over the blocking forecasting core
//!
//! Provider calls and model training run on tokio's blocking pool. A
//! sequence-model run is capped by `forecast_timeout`; when the cap expires the
//! run is cancelled and the naive delta estimate on the same history is
//! returned instead.

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::news::{Headline, NewsProvider};
use crate::report::{self, Section};
use forecast_trade::data::normalize_symbol;
use forecast_trade::models::CancelFlag;
use forecast_trade::{
    ForecastCache, MarketDataProvider, PredictionResult, Predictor, SignalAggregator,
    StrategyKind, Suggestion, TrendReport,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct ForecastService {
    predictor: Arc<Predictor>,
    signals: Arc<SignalAggregator>,
    news: Option<Arc<dyn NewsProvider>>,
    news_limit: usize,
    forecast_timeout: Duration,
}

/// Run `task` on the blocking pool
async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> forecast_trade::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(task).await??)
}

impl ForecastService {
    pub fn new(predictor: Predictor, signals: SignalAggregator, forecast_timeout: Duration) -> Self {
        Self {
            predictor: Arc::new(predictor),
            signals: Arc::new(signals),
            news: None,
            news_limit: 0,
            forecast_timeout,
        }
    }

    /// Wire predictor, signals and optional cache from `config`
    pub fn from_config(config: &BotConfig, provider: Arc<dyn MarketDataProvider>) -> Result<Self> {
        let mut predictor = Predictor::new(provider.clone(), config.predictor.clone())?;
        if let Some(ttl) = config.cache_ttl {
            predictor = predictor.with_cache(Arc::new(ForecastCache::new(ttl)));
        }
        let signals = SignalAggregator::new(provider, config.signals.clone());
        Ok(Self::new(predictor, signals, config.forecast_timeout))
    }

    pub fn with_news(mut self, news: Arc<dyn NewsProvider>, limit: usize) -> Self {
        self.news = Some(news);
        self.news_limit = limit;
        self
    }

    pub fn forecast_timeout(&self) -> Duration {
        self.forecast_timeout
    }

    /// Forecast `symbol` with `kind`; `days` overrides the configured lookback
    pub async fn forecast(
        &self,
        symbol: &str,
        kind: StrategyKind,
        days: Option<usize>,
    ) -> Result<PredictionResult> {
        let symbol = normalize_symbol(symbol);
        let predictor = self.predictor.clone();
        let history = {
            let predictor = predictor.clone();
            blocking(move || predictor.fetch_history(&symbol, kind, days)).await?
        };

        if kind != StrategyKind::SequenceModel {
            return blocking(move || {
                predictor.predict_history(&history, kind, &CancelFlag::default())
            })
            .await;
        }

        let history = Arc::new(history);
        let cancel = CancelFlag::new();
        let task = {
            let predictor = predictor.clone();
            let history = history.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || predictor.predict_history(&history, kind, &cancel))
        };

        match tokio::time::timeout(self.forecast_timeout, task).await {
            Ok(joined) => Ok(joined??),
            Err(_) => {
                cancel.cancel();
                warn!(
                    symbol = %history.symbol(),
                    timeout = ?self.forecast_timeout,
                    "sequence model timed out, falling back to naive delta"
                );
                let timeout = self.forecast_timeout;
                let fallback = blocking(move || {
                    predictor.predict_history(
                        &history,
                        StrategyKind::NaiveDelta,
                        &CancelFlag::default(),
                    )
                })
                .await
                .map_err(|_| BotError::Timeout(timeout))?;
                let note = format!(
                    "Sequence model exceeded {:?}; fell back to naive delta. {}",
                    timeout,
                    fallback.confidence_note()
                );
                Ok(fallback.with_note(note))
            }
        }
    }

    pub async fn current_price(&self, symbol: &str) -> Result<f64> {
        let symbol = normalize_symbol(symbol);
        let signals = self.signals.clone();
        blocking(move || signals.fetch_current_price(&symbol)).await
    }

    pub async fn trend(&self, symbol: &str, days: Option<usize>) -> Result<TrendReport> {
        let symbol = normalize_symbol(symbol);
        let signals = self.signals.clone();
        blocking(move || signals.fetch_trend(&symbol, days)).await
    }

    pub async fn suggestion(&self, symbol: &str, days: Option<usize>) -> Result<Suggestion> {
        let symbol = normalize_symbol(symbol);
        let signals = self.signals.clone();
        blocking(move || signals.fetch_suggestion(&symbol, days)).await
    }

    /// Headlines, or `None` when no news source is configured
    pub async fn headlines(&self, symbol: &str) -> Result<Option<Vec<Headline>>> {
        let Some(news) = self.news.clone() else {
            return Ok(None);
        };
        let symbol = normalize_symbol(symbol);
        let limit = self.news_limit;
        blocking(move || news.headlines(&symbol, limit)).await.map(Some)
    }

    /// Text for one section; failures become an error line
    pub async fn section(&self, symbol: &str, section: Section) -> Option<String> {
        let symbol = normalize_symbol(symbol);
        let outcome = match section {
            Section::Price => self
                .current_price(&symbol)
                .await
                .map(|price| Some(report::format_price(&symbol, price))),
            Section::Trend => self
                .trend(&symbol, None)
                .await
                .map(|trend| Some(report::format_trend(&trend))),
            Section::Forecast(kind) => self
                .forecast(&symbol, kind, None)
                .await
                .map(|result| Some(report::format_prediction(&result))),
            Section::Suggestion => self
                .suggestion(&symbol, None)
                .await
                .map(|suggestion| Some(report::format_suggestion(&symbol, suggestion))),
            Section::News => self.headlines(&symbol).await.map(|headlines| {
                headlines.map(|headlines| report::format_headlines(&symbol, &headlines))
            }),
        };

        match outcome {
            Ok(text) => text,
            Err(err) => {
                error!(symbol = %symbol, section = %section, error = %err, "report section failed");
                Some(report::format_error(section, &err))
            }
        }
    }

    /// Run `sections` independently and join their texts
    pub async fn full_report(&self, symbol: &str, sections: &[Section]) -> String {
        let mut parts = Vec::with_capacity(sections.len());
        for section in sections {
            if let Some(text) = self.section(symbol, *section).await {
                parts.push(text);
            }
        }
        info!(symbol = %normalize_symbol(symbol), sections = parts.len(), "report ready");
        parts.join("\n\n")
    }
}
