//! # owl_bot
//!
//! The caller-facing side of the forecaster: environment configuration, an
//! async [`ForecastService`] that keeps training off the executor and caps it
//! with a timeout, report formatting, chat command routing, and live HTTP
//! market data and news sources.
//!
//! ```no_run
//! use forecast_trade::{InMemoryProvider, PriceHistory};
//! use owl_bot::{BotConfig, ForecastService, Section};
//! use std::sync::Arc;
//!
//! # async fn demo() -> owl_bot::Result<()> {
//! let history = PriceHistory::new("BTC", vec![100.0, 101.5, 99.8, 102.3])?;
//! let provider = Arc::new(InMemoryProvider::new().with_history(history));
//! let service = ForecastService::from_config(&BotConfig::default(), provider)?;
//! println!("{}", service.full_report("btc", &[Section::Price, Section::Trend]).await);
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod news;
pub mod report;
pub mod service;

pub use crate::chat::{ChatId, ChatMode, ChatResponder, Command, Dispatcher, StdoutResponder};
pub use crate::config::BotConfig;
pub use crate::error::{BotError, Result};
pub use crate::http::HttpMarketData;
pub use crate::news::{Headline, NewsProvider, RssNews};
pub use crate::report::Section;
pub use crate::service::ForecastService;
