//! # Trade Math
//!
//! Numeric building blocks shared by the forecasting crates.
//! This crate slices price series into supervised windows, rescales them into
//! a bounded range and provides the rounding used in every reported figure.

use thiserror::Error;

pub mod normalize;
pub mod stats;
pub mod window;

pub use normalize::{MinMaxScaler, NormalizationState};
pub use stats::{round2, round_to};
pub use window::{windows, Window};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: need at least {required} points, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
