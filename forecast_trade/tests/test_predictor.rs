use forecast_trade::error::{ForecastError, Result};
use forecast_trade::models::{CancelFlag, SequenceModelConfig};
use forecast_trade::provider::{InMemoryProvider, MarketDataProvider};
use forecast_trade::{
    ForecastCache, Predictor, PredictorConfig, PriceHistory, StrategyKind, Suggestion,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Provider that always fails the way a network client would
struct OfflineProvider;

impl MarketDataProvider for OfflineProvider {
    fn fetch_close_series(&self, symbol: &str, _period_days: usize) -> Result<PriceHistory> {
        Err(ForecastError::unavailable(symbol, "connection timed out"))
    }
}

/// Provider that counts how many points it was asked for
struct RecordingProvider {
    inner: InMemoryProvider,
    last_period: AtomicUsize,
}

impl MarketDataProvider for RecordingProvider {
    fn fetch_close_series(&self, symbol: &str, period_days: usize) -> Result<PriceHistory> {
        self.last_period.store(period_days, Ordering::SeqCst);
        self.inner.fetch_close_series(symbol, period_days)
    }
}

fn small_config() -> PredictorConfig {
    PredictorConfig {
        forecast_history_days: 20,
        mean_reversion_window: 10,
        sequence: SequenceModelConfig {
            window_size: 5,
            hidden_size: 4,
            epochs: 2,
            ..Default::default()
        },
    }
}

fn provider_with(symbol: &str, len: usize) -> InMemoryProvider {
    let closes = (0..len).map(|i| 50.0 + (i as f64 * 0.4).cos() * 3.0).collect();
    InMemoryProvider::new().with_history(PriceHistory::new(symbol, closes).unwrap())
}

#[test]
fn test_predict_naive_through_provider() {
    let provider = InMemoryProvider::new()
        .with_history(PriceHistory::new("ABC", vec![8.0, 10.0, 12.0]).unwrap());
    let predictor = Predictor::new(Arc::new(provider), small_config()).unwrap();

    let result = predictor.predict("abc", StrategyKind::NaiveDelta, None).unwrap();

    assert_eq!(result.symbol(), "ABC");
    assert_eq!(result.estimated_next_value(), Some(14.0));
}

#[test]
fn test_each_strategy_fetches_its_own_period() {
    let provider = Arc::new(RecordingProvider {
        inner: provider_with("ETH", 100),
        last_period: AtomicUsize::new(0),
    });
    let predictor = Predictor::new(provider.clone(), small_config()).unwrap();

    predictor.predict("ETH", StrategyKind::SequenceModel, None).unwrap();
    assert_eq!(provider.last_period.load(Ordering::SeqCst), 20);

    predictor.predict("ETH", StrategyKind::MeanReversion, None).unwrap();
    assert_eq!(provider.last_period.load(Ordering::SeqCst), 10);

    assert_eq!(predictor.history_days(StrategyKind::NaiveDelta), 20);
}

#[test]
fn test_data_unavailable_reaches_the_caller() {
    let predictor = Predictor::new(Arc::new(OfflineProvider), small_config()).unwrap();

    for kind in StrategyKind::ALL {
        match predictor.predict("BTC", kind, None) {
            Err(ForecastError::DataUnavailable { symbol, reason }) => {
                assert_eq!(symbol, "BTC");
                assert_eq!(reason, "connection timed out");
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }
}

#[test]
fn test_strategies_fail_independently() {
    // Too short for a 5-point window, long enough for the cheap strategies
    let provider = InMemoryProvider::new()
        .with_history(PriceHistory::new("NEW", vec![10.0, 11.0, 9.0, 12.0]).unwrap());
    let predictor = Predictor::new(Arc::new(provider), small_config()).unwrap();

    assert!(matches!(
        predictor.predict("NEW", StrategyKind::SequenceModel, None),
        Err(ForecastError::InsufficientHistory { .. })
    ));
    assert_eq!(
        predictor
            .predict("NEW", StrategyKind::NaiveDelta, None)
            .unwrap()
            .estimated_next_value(),
        Some(15.0)
    );
    assert_eq!(
        predictor
            .predict("NEW", StrategyKind::MeanReversion, None)
            .unwrap()
            .signal(),
        Some(Suggestion::Buy)
    );
}

#[test]
fn test_predict_history_respects_cancellation() {
    let predictor = Predictor::new(Arc::new(provider_with("SOL", 30)), small_config()).unwrap();
    let history = predictor.fetch_history("SOL", StrategyKind::SequenceModel, None).unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();

    assert!(matches!(
        predictor.predict_history(&history, StrategyKind::SequenceModel, &cancel),
        Err(ForecastError::Cancelled)
    ));
    assert!(predictor
        .predict_history(&history, StrategyKind::NaiveDelta, &cancel)
        .is_ok());
}

#[test]
fn test_config_validation() {
    let too_short = PredictorConfig {
        forecast_history_days: 5,
        ..small_config()
    };
    assert!(matches!(
        Predictor::new(Arc::new(InMemoryProvider::new()), too_short),
        Err(ForecastError::InvalidParameter(_))
    ));

    let no_window = PredictorConfig {
        mean_reversion_window: 0,
        ..small_config()
    };
    assert!(Predictor::new(Arc::new(InMemoryProvider::new()), no_window).is_err());
    assert!(PredictorConfig::default().validate().is_ok());
}

#[test]
fn test_cached_predictor_reuses_sequence_forecast() {
    let cache = Arc::new(ForecastCache::new(Duration::from_secs(60)));
    let predictor = Predictor::new(Arc::new(provider_with("ADA", 40)), small_config())
        .unwrap()
        .with_cache(cache.clone());

    let first = predictor.predict("ADA", StrategyKind::SequenceModel, None).unwrap();
    let second = predictor.predict("ADA", StrategyKind::SequenceModel, None).unwrap();
    predictor.predict("ADA", StrategyKind::NaiveDelta, None).unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_days_override_reaches_provider() {
    let provider = Arc::new(RecordingProvider {
        inner: provider_with("ETH", 100),
        last_period: AtomicUsize::new(0),
    });
    let predictor = Predictor::new(provider.clone(), small_config()).unwrap();

    predictor.predict("ETH", StrategyKind::NaiveDelta, Some(15)).unwrap();
    assert_eq!(provider.last_period.load(Ordering::SeqCst), 15);

    predictor.predict("ETH", StrategyKind::MeanReversion, Some(3)).unwrap();
    assert_eq!(provider.last_period.load(Ordering::SeqCst), 3);

    predictor.predict("ETH", StrategyKind::SequenceModel, Some(30)).unwrap();
    assert_eq!(provider.last_period.load(Ordering::SeqCst), 30);

    let history = predictor
        .fetch_history("ETH", StrategyKind::NaiveDelta, Some(12))
        .unwrap();
    assert_eq!(history.len(), 12);
}

#[test]
fn test_days_override_is_validated() {
    let predictor = Predictor::new(Arc::new(provider_with("ETH", 100)), small_config()).unwrap();

    // window_size is 5 in small_config
    for days in [0, 5] {
        assert!(matches!(
            predictor.predict("ETH", StrategyKind::SequenceModel, Some(days)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
    assert!(matches!(
        predictor.predict("ETH", StrategyKind::NaiveDelta, Some(0)),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert_eq!(predictor.lookback(StrategyKind::SequenceModel, Some(6)).unwrap(), 6);
    assert_eq!(predictor.lookback(StrategyKind::MeanReversion, Some(2)).unwrap(), 2);
    assert_eq!(predictor.lookback(StrategyKind::MeanReversion, None).unwrap(), 10);
}

#[test]
fn test_shared_cache_separates_model_configs() {
    let cache = Arc::new(ForecastCache::new(Duration::from_secs(60)));
    let provider: Arc<dyn MarketDataProvider> = Arc::new(provider_with("ADA", 40));
    let short = Predictor::new(provider.clone(), small_config())
        .unwrap()
        .with_cache(cache.clone());
    let mut long_config = small_config();
    long_config.sequence.epochs = 7;
    long_config.sequence.seed = long_config.sequence.seed.wrapping_add(1);
    let long = Predictor::new(provider.clone(), long_config.clone())
        .unwrap()
        .with_cache(cache.clone());

    let first = short.predict("ADA", StrategyKind::SequenceModel, None).unwrap();
    let second = long.predict("ADA", StrategyKind::SequenceModel, None).unwrap();
    let uncached = Predictor::new(provider, long_config)
        .unwrap()
        .predict("ADA", StrategyKind::SequenceModel, None)
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(second, uncached);
    assert_eq!(cache.len(), 2);
}
