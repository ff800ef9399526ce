//! # Price Owl
//!
//! `price_owl` bundles the workspace crates behind one import:
//!
//! - [`trade_math`]: windowing, min-max scaling and rounding helpers
//! - [`forecast_trade`]: price histories, the LSTM sequence model, strategies
//!   and the predictor
//! - [`owl_bot`]: the async service, report formatting and chat routing
//!
//! ## Example
//!
//! ```
//! use price_owl::prelude::*;
//! use std::sync::Arc;
//!
//! let history = PriceHistory::new("AAPL", vec![189.5, 190.25, 191.0]).unwrap();
//! let provider = Arc::new(InMemoryProvider::new().with_history(history));
//! let predictor = Predictor::new(provider, PredictorConfig::default()).unwrap();
//!
//! let result = predictor.predict("aapl", StrategyKind::NaiveDelta, None).unwrap();
//! assert_eq!(result.estimated_next_value(), Some(191.75));
//! ```

pub use forecast_trade;
pub use owl_bot;
pub use trade_math;

/// The types most callers need
pub mod prelude {
    pub use forecast_trade::{
        ForecastError, InMemoryProvider, MarketDataProvider, PredictionResult, Predictor,
        PredictorConfig, PriceHistory, SignalAggregator, StrategyKind, Suggestion,
        TrendDirection,
    };
    pub use owl_bot::{BotConfig, BotError, ForecastService, Section};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_prelude_wires_predictor() {
        let history = PriceHistory::new("ETH", vec![10.0, 9.0, 11.0]).unwrap();
        let provider = Arc::new(InMemoryProvider::new().with_history(history));
        let predictor = Predictor::new(provider, PredictorConfig::default()).unwrap();

        let result = predictor.predict("ETH", StrategyKind::MeanReversion, None).unwrap();
        assert_eq!(result.signal(), Some(Suggestion::Buy));
        assert_eq!(result.estimated_next_value(), None);
    }

    #[test]
    fn test_trend_from_history() {
        let history = PriceHistory::new("ETH", vec![10.0, 9.0, 11.0]).unwrap();
        let trend = SignalAggregator::trend(&history).unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
    }
}
