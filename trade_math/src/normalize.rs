//! Min-max scaling into the unit interval
//!
//! The scaler is fitted once over a whole series and then used to map values
//! into `[0, 1]` and back. A series made of one repeated value has no spread;
//! such a state maps everything to `0.5` and inverts everything to the
//! repeated value instead of dividing by zero.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Value returned by [`MinMaxScaler::transform`] for a degenerate state
pub const DEGENERATE_MIDPOINT: f64 = 0.5;

/// Bounds fitted from a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationState {
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
}

impl NormalizationState {
    /// True when the fitted series had no spread (`max == min`)
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Width of the fitted range
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Min-max scaler
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxScaler;

impl MinMaxScaler {
    /// Fit bounds over `series`
    pub fn fit(series: &[f64]) -> Result<NormalizationState> {
        if series.is_empty() {
            return Err(MathError::InsufficientData {
                required: 1,
                available: 0,
            });
        }

        if series.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Cannot fit a scaler over non-finite values".to_string(),
            ));
        }

        let (min, max) = series
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(NormalizationState { min, max })
    }

    /// Map `value` into the unit interval of `state`
    pub fn transform(value: f64, state: &NormalizationState) -> f64 {
        if state.is_degenerate() {
            return DEGENERATE_MIDPOINT;
        }
        (value - state.min) / state.span()
    }

    /// Map a scaled value back to the original units
    pub fn inverse(value: f64, state: &NormalizationState) -> f64 {
        if state.is_degenerate() {
            return state.min;
        }
        value * state.span() + state.min
    }

    /// Fit over `series` and return the scaled copy together with the state
    pub fn fit_transform(series: &[f64]) -> Result<(Vec<f64>, NormalizationState)> {
        let state = Self::fit(series)?;
        let scaled = series.iter().map(|&v| Self::transform(v, &state)).collect();
        Ok((scaled, state))
    }
}
