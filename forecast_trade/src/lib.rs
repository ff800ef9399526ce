//! # Forecast Trade
//!
//! Short-horizon price forecasting for a single symbol.
//!
//! ## Features
//!
//! - Closing-price histories with strict validation ([`PriceHistory`])
//! - A windowed LSTM trained per request ([`models`])
//! - Three interchangeable estimators behind one result type ([`strategies`])
//! - Trend and buy/avoid signals that need no model ([`signals`])
//! - Pluggable market data ([`provider`]) and an optional forecast cache
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use forecast_trade::{InMemoryProvider, Predictor, PredictorConfig, PriceHistory, StrategyKind};
//!
//! let history = PriceHistory::new("ACME", vec![10.0, 12.0]).unwrap();
//! let provider = Arc::new(InMemoryProvider::new().with_history(history));
//! let predictor = Predictor::new(provider, PredictorConfig::default()).unwrap();
//!
//! let result = predictor.predict("acme", StrategyKind::NaiveDelta, None).unwrap();
//! assert_eq!(result.estimated_next_value(), Some(14.0));
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod models;
pub mod predictor;
pub mod provider;
pub mod signals;
pub mod strategies;

// Re-export commonly used types
pub use crate::cache::ForecastCache;
pub use crate::data::PriceHistory;
pub use crate::error::{ForecastError, Result};
pub use crate::models::{CancelFlag, SequenceModel, SequenceModelConfig};
pub use crate::predictor::{Predictor, PredictorConfig};
pub use crate::provider::{CsvProvider, InMemoryProvider, MarketDataProvider};
pub use crate::signals::{
    SignalAggregator, SignalConfig, SignalReport, Suggestion, TrendDirection, TrendReport,
};
pub use crate::strategies::{ForecastStrategy, PredictionResult, StrategyKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
