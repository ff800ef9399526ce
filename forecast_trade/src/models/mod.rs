//! Trainable sequence models
//!
//! A sequence model maps a window of scaled prices to a scalar estimate of the
//! next scaled price. Parameters are exposed as one flat vector so the
//! [`Trainer`](trainer::Trainer) can optimise any model without knowing its
//! internal layout.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod lstm;
pub mod trainer;

pub use lstm::LstmModel;
pub use trainer::{Adam, CancelFlag, Trainer, TrainingReport, TrainingState};

/// Trainable function from a window of length `window_size` to a scalar
pub trait SequenceModel: Debug + Send {
    /// Expected window length
    fn window_size(&self) -> usize;

    /// Estimate the value following `window`
    fn predict(&self, window: &[f64]) -> Result<f64>;

    /// Squared error against `label` and its gradient for every parameter
    fn gradient(&self, window: &[f64], label: f64) -> Result<(f64, Vec<f64>)>;

    /// Flat parameter vector
    fn parameters(&self) -> &[f64];

    /// Mutable flat parameter vector, used by the optimiser
    fn parameters_mut(&mut self) -> &mut [f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Hyper-parameters of the LSTM forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceModelConfig {
    /// Number of past closes fed to the model
    pub window_size: usize,
    /// LSTM hidden units
    pub hidden_size: usize,
    /// Full passes over all windows
    pub epochs: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Maximum global gradient norm, `None` disables clipping
    pub gradient_clip: Option<f64>,
    /// Seed for parameter initialisation
    pub seed: u64,
}

impl Default for SequenceModelConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            hidden_size: 32,
            epochs: 5,
            learning_rate: 0.01,
            gradient_clip: Some(5.0),
            seed: 42,
        }
    }
}

impl SequenceModelConfig {
    /// Check that every field is usable
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }
        if self.hidden_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Hidden size must be positive".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(ForecastError::InvalidParameter(
                "At least one training epoch is required".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if let Some(clip) = self.gradient_clip {
            if !(clip.is_finite() && clip > 0.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Gradient clip must be a positive number, got {}",
                    clip
                )));
            }
        }
        Ok(())
    }
}
