//! Error types for the owl_bot crate

use forecast_trade::ForecastError;
use std::time::Duration;
use thiserror::Error;

/// Failures at the caller-facing boundary
#[derive(Debug, Error)]
pub enum BotError {
    /// A typed failure from the forecasting core
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// The sequence model exceeded its wall-clock cap and no fallback ran
    #[error("Forecast timed out after {0:?}")]
    Timeout(Duration),

    /// A blocking worker panicked or was aborted
    #[error("Worker task failed: {0}")]
    Worker(String),

    /// Invalid environment configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<tokio::task::JoinError> for BotError {
    fn from(err: tokio::task::JoinError) -> Self {
        BotError::Worker(err.to_string())
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, BotError>;
