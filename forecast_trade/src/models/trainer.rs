//! Fitting a [`SequenceModel`] to a scaled series
//!
//! Training is plain stochastic optimisation: every epoch visits each window
//! once, in chronological order, with a batch size of one. There is no early
//! stopping and no validation split.

use crate::error::{ForecastError, Result};
use crate::models::{SequenceModel, SequenceModelConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use trade_math::windows;

/// Lifecycle of one training run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// Nothing has been fitted yet
    Uninitialized,
    /// Optimisation is in progress (epochs count from 1)
    Training { epoch: usize },
    /// Parameters are fitted and finite
    Ready,
    /// The run failed; the model must not be used
    Failed,
}

/// Summary of a finished training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Number of completed epochs
    pub epochs: usize,
    /// Windows visited per epoch
    pub windows: usize,
    /// Mean squared error of each epoch
    pub loss_history: Vec<f64>,
    /// Mean squared error of the last epoch
    pub final_loss: f64,
}

/// Shared flag that asks a running trainer to stop
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Adam optimiser state
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    /// Create an optimiser for `parameter_count` parameters
    pub fn new(learning_rate: f64, parameter_count: usize) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            m: vec![0.0; parameter_count],
            v: vec![0.0; parameter_count],
            t: 0,
        }
    }

    /// Apply one update in place
    pub fn step(&mut self, params: &mut [f64], grads: &[f64]) {
        self.t = self.t.saturating_add(1);
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        for (k, (param, &grad)) in params.iter_mut().zip(grads).enumerate() {
            self.m[k] = self.beta1 * self.m[k] + (1.0 - self.beta1) * grad;
            self.v[k] = self.beta2 * self.v[k] + (1.0 - self.beta2) * grad * grad;

            let m_hat = self.m[k] / bias1;
            let v_hat = self.v[k] / bias2;
            *param -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

/// Runs a fixed number of optimisation passes over all windows of a series
#[derive(Debug)]
pub struct Trainer {
    epochs: usize,
    learning_rate: f64,
    gradient_clip: Option<f64>,
    cancel: CancelFlag,
    state: TrainingState,
}

impl Trainer {
    /// Create a trainer
    pub fn new(epochs: usize, learning_rate: f64) -> Result<Self> {
        if epochs == 0 {
            return Err(ForecastError::InvalidParameter(
                "At least one training epoch is required".to_string(),
            ));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Learning rate must be a positive number, got {}",
                learning_rate
            )));
        }

        Ok(Self {
            epochs,
            learning_rate,
            gradient_clip: None,
            cancel: CancelFlag::default(),
            state: TrainingState::Uninitialized,
        })
    }

    /// Create a trainer from model hyper-parameters
    pub fn from_config(config: &SequenceModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.epochs, config.learning_rate)?
            .with_gradient_clip(config.gradient_clip))
    }

    /// Rescale gradients whose global norm exceeds `max_norm`
    pub fn with_gradient_clip(mut self, max_norm: Option<f64>) -> Self {
        self.gradient_clip = max_norm;
        self
    }

    /// Observe `cancel` between windows
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Fit `model` to every window of `series`
    ///
    /// `series` must hold at least `window_size + 1` points. A non-finite loss
    /// or parameter fails the run with [`ForecastError::TrainingDiverged`].
    pub fn fit<M>(&mut self, model: &mut M, series: &[f64]) -> Result<TrainingReport>
    where
        M: SequenceModel + ?Sized,
    {
        let result = self.run(model, series);
        self.state = match &result {
            Ok(_) => TrainingState::Ready,
            Err(_) => TrainingState::Failed,
        };
        result
    }

    fn run<M>(&mut self, model: &mut M, series: &[f64]) -> Result<TrainingReport>
    where
        M: SequenceModel + ?Sized,
    {
        let windows = windows(series, model.window_size())?;
        let mut optimizer = Adam::new(self.learning_rate, model.parameters().len());
        let mut loss_history = Vec::with_capacity(self.epochs);

        debug!(
            model = model.name(),
            windows = windows.len(),
            epochs = self.epochs,
            "training started"
        );

        for epoch in 1..=self.epochs {
            self.state = TrainingState::Training { epoch };
            let mut epoch_loss = 0.0;

            for window in &windows {
                if self.cancel.is_cancelled() {
                    debug!(epoch, "training cancelled");
                    return Err(ForecastError::Cancelled);
                }

                let (loss, mut grads) = model.gradient(window.inputs, window.label)?;
                if !loss.is_finite() {
                    return Err(ForecastError::TrainingDiverged { epoch, loss });
                }

                if let Some(max_norm) = self.gradient_clip {
                    clip_by_norm(&mut grads, max_norm);
                }
                optimizer.step(model.parameters_mut(), &grads);

                if model.parameters().iter().any(|p| !p.is_finite()) {
                    return Err(ForecastError::TrainingDiverged {
                        epoch,
                        loss: f64::NAN,
                    });
                }

                epoch_loss += loss;
            }

            let mean_loss = epoch_loss / windows.len() as f64;
            if !mean_loss.is_finite() {
                return Err(ForecastError::TrainingDiverged {
                    epoch,
                    loss: mean_loss,
                });
            }

            debug!(epoch, loss = mean_loss, "epoch finished");
            loss_history.push(mean_loss);
        }

        let final_loss = loss_history.last().copied().unwrap_or(f64::NAN);
        Ok(TrainingReport {
            epochs: self.epochs,
            windows: windows.len(),
            loss_history,
            final_loss,
        })
    }
}

fn clip_by_norm(grads: &mut [f64], max_norm: f64) {
    let norm = grads.iter().map(|g| g * g).sum::<f64>().sqrt();
    if norm.is_finite() && norm > max_norm {
        let scale = max_norm / norm;
        grads.iter_mut().for_each(|g| *g *= scale);
    }
}
