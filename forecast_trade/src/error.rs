//! Error types for the forecast_trade crate

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the forecast_trade crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few data points for the requested window
    #[error("Insufficient history: need at least {required} points, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// The market data collaborator could not supply a series
    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Loss or parameters became non-finite during optimisation
    #[error("Training diverged at epoch {epoch} (loss = {loss})")]
    TrainingDiverged { epoch: usize, loss: f64 },

    /// The run was abandoned by its caller
    #[error("Forecast cancelled")]
    Cancelled,

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV decoding
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl ForecastError {
    /// Shorthand for a provider failure
    pub fn unavailable(symbol: impl Into<String>, reason: impl ToString) -> Self {
        ForecastError::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData {
                required,
                available,
            } => ForecastError::InsufficientHistory {
                required,
                available,
            },
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            MathError::CalculationError(msg) => ForecastError::DataError(msg),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
