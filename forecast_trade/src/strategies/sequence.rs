//! LSTM forecast trained on the request's own history
//!
//! Pipeline: min-max scaling over the whole history, stride-1 windows,
//! a freshly initialised [`LstmModel`] fitted by the [`Trainer`], a forward
//! pass over the most recent window and the inverse scaling of its output.
//! Nothing survives the call.
//!
//! The scaler sees every point, including the labels of the training
//! windows. That mirrors how the estimator has always behaved; it is a mild
//! look-ahead and intentionally left in place.

use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use crate::models::{CancelFlag, LstmModel, SequenceModel, SequenceModelConfig, Trainer};
use crate::strategies::{ForecastStrategy, PredictionResult, StrategyKind};
use tracing::{info, warn};
use trade_math::MinMaxScaler;

/// Full sequence-model pipeline
#[derive(Debug, Clone, Default)]
pub struct SequenceModelStrategy {
    config: SequenceModelConfig,
    cancel: CancelFlag,
}

impl SequenceModelStrategy {
    pub fn new(config: SequenceModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancelFlag::default(),
        })
    }

    /// Abandon training as soon as `cancel` is set
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SequenceModelConfig {
        &self.config
    }
}

impl ForecastStrategy for SequenceModelStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SequenceModel
    }

    fn min_history(&self) -> usize {
        self.config.window_size + 1
    }

    fn estimate(&self, history: &PriceHistory) -> Result<PredictionResult> {
        history.ensure_len(self.min_history())?;

        let window = self.config.window_size;
        let (scaled, state) = MinMaxScaler::fit_transform(history.closes())?;
        if state.is_degenerate() {
            warn!(
                symbol = history.symbol(),
                price = state.min,
                "flat price series, scaling collapses to the midpoint"
            );
        }

        let mut model = LstmModel::new(window, self.config.hidden_size, self.config.seed)?;
        let mut trainer = Trainer::from_config(&self.config)?.with_cancel(self.cancel.clone());
        let report = trainer.fit(&mut model, &scaled)?;

        let scaled_estimate = model.predict(&scaled[scaled.len() - window..])?;
        let estimate = MinMaxScaler::inverse(scaled_estimate, &state);
        if !estimate.is_finite() {
            return Err(ForecastError::TrainingDiverged {
                epoch: report.epochs,
                loss: report.final_loss,
            });
        }

        info!(
            symbol = history.symbol(),
            estimate,
            final_loss = report.final_loss,
            windows = report.windows,
            "sequence model forecast ready"
        );

        Ok(PredictionResult::estimate(
            history.symbol(),
            estimate,
            self.kind(),
            format!(
                "{} trained for {} epochs on {} windows (final MSE {:.6}); best-effort estimate",
                model.name(),
                report.epochs,
                report.windows,
                report.final_loss
            ),
        ))
    }
}
