use approx::assert_relative_eq;
use forecast_trade::error::{ForecastError, Result};
use forecast_trade::models::{
    Adam, CancelFlag, LstmModel, SequenceModel, SequenceModelConfig, Trainer, TrainingState,
};

/// Helper producing a smooth series already inside the unit interval
fn scaled_wave(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 + 0.4 * (i as f64 * 0.3).sin())
        .collect()
}

/// A model whose loss is never finite
#[derive(Debug)]
struct ExplodingModel {
    params: Vec<f64>,
}

impl SequenceModel for ExplodingModel {
    fn window_size(&self) -> usize {
        2
    }

    fn predict(&self, _window: &[f64]) -> Result<f64> {
        Ok(f64::NAN)
    }

    fn gradient(&self, _window: &[f64], _label: f64) -> Result<(f64, Vec<f64>)> {
        Ok((f64::NAN, vec![0.0; self.params.len()]))
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn name(&self) -> &str {
        "exploding"
    }
}

#[test]
fn test_lstm_parameter_count() {
    let model = LstmModel::new(5, 3, 7).unwrap();

    // 4H input weights + 4H*H recurrent + 4H biases + H read-out + 1
    assert_eq!(model.parameters().len(), 12 + 36 + 12 + 3 + 1);
    assert_eq!(LstmModel::parameter_count(3), 64);
    assert_eq!(model.window_size(), 5);
    assert_eq!(model.hidden_size(), 3);
}

#[test]
fn test_lstm_initialisation_is_seeded() {
    let a = LstmModel::new(4, 6, 42).unwrap();
    let b = LstmModel::new(4, 6, 42).unwrap();
    let c = LstmModel::new(4, 6, 43).unwrap();

    assert_eq!(a.parameters(), b.parameters());
    assert_ne!(a.parameters(), c.parameters());

    let window = [0.1, 0.4, 0.35, 0.8];
    assert_eq!(a.predict(&window).unwrap(), b.predict(&window).unwrap());
}

#[test]
fn test_lstm_rejects_bad_shapes() {
    assert!(LstmModel::new(0, 4, 1).is_err());
    assert!(LstmModel::new(4, 0, 1).is_err());
    assert!(LstmModel::from_parameters(4, 2, vec![0.0; 3]).is_err());

    let model = LstmModel::new(4, 2, 1).unwrap();
    assert!(matches!(
        model.predict(&[0.1, 0.2]),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_lstm_gradient_matches_finite_differences() {
    let model = LstmModel::new(4, 3, 11).unwrap();
    let window = [0.2, 0.7, 0.4, 0.9];
    let label = 0.65;

    let (loss, analytic) = model.gradient(&window, label).unwrap();
    let prediction = model.predict(&window).unwrap();
    assert_relative_eq!(loss, (prediction - label).powi(2), epsilon = 1e-12);

    let eps = 1e-6;
    for k in 0..analytic.len() {
        let mut plus = model.parameters().to_vec();
        plus[k] += eps;
        let mut minus = model.parameters().to_vec();
        minus[k] -= eps;

        let loss_plus = LstmModel::from_parameters(4, 3, plus)
            .unwrap()
            .gradient(&window, label)
            .unwrap()
            .0;
        let loss_minus = LstmModel::from_parameters(4, 3, minus)
            .unwrap()
            .gradient(&window, label)
            .unwrap()
            .0;
        let numeric = (loss_plus - loss_minus) / (2.0 * eps);

        assert_relative_eq!(analytic[k], numeric, epsilon = 1e-6, max_relative = 1e-4);
    }
}

#[test]
fn test_adam_moves_against_gradient() {
    let mut adam = Adam::new(0.1, 2);
    let mut params = vec![1.0, -1.0];

    adam.step(&mut params, &[2.0, -0.5]);

    assert_relative_eq!(params[0], 0.9, epsilon = 1e-6);
    assert_relative_eq!(params[1], -0.9, epsilon = 1e-6);
}

#[test]
fn test_trainer_reduces_loss() {
    let series = scaled_wave(60);
    let mut model = LstmModel::new(5, 8, 3).unwrap();
    let mut trainer = Trainer::new(30, 0.01).unwrap();

    assert_eq!(trainer.state(), TrainingState::Uninitialized);

    let report = trainer.fit(&mut model, &series).unwrap();

    assert_eq!(trainer.state(), TrainingState::Ready);
    assert_eq!(report.epochs, 30);
    assert_eq!(report.windows, 55);
    assert_eq!(report.loss_history.len(), 30);
    assert_eq!(report.final_loss, report.loss_history[29]);
    assert!(report.final_loss < report.loss_history[0]);
    assert!(model.parameters().iter().all(|p| p.is_finite()));
}

#[test]
fn test_trainer_fails_on_short_series() {
    let mut model = LstmModel::new(5, 2, 3).unwrap();
    let mut trainer = Trainer::new(2, 0.01).unwrap();

    let err = trainer.fit(&mut model, &[0.1, 0.2, 0.3, 0.4, 0.5]).unwrap_err();

    assert!(matches!(
        err,
        ForecastError::InsufficientHistory {
            required: 6,
            available: 5
        }
    ));
    assert_eq!(trainer.state(), TrainingState::Failed);
}

#[test]
fn test_trainer_reports_non_finite_loss() {
    let mut model = ExplodingModel {
        params: vec![0.0; 3],
    };
    let mut trainer = Trainer::new(5, 0.01).unwrap();

    let err = trainer.fit(&mut model, &[0.1, 0.2, 0.3, 0.4]).unwrap_err();

    assert!(matches!(err, ForecastError::TrainingDiverged { epoch: 1, .. }));
    assert_eq!(trainer.state(), TrainingState::Failed);
}

#[test]
fn test_trainer_detects_divergence_from_huge_steps() {
    let series = scaled_wave(40);
    let mut model = LstmModel::new(5, 4, 9).unwrap();
    let mut trainer = Trainer::new(5, 1e300).unwrap();

    let err = trainer.fit(&mut model, &series).unwrap_err();

    assert!(matches!(err, ForecastError::TrainingDiverged { .. }));
    assert_eq!(trainer.state(), TrainingState::Failed);
}

#[test]
fn test_trainer_honours_cancellation() {
    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut model = LstmModel::new(3, 2, 1).unwrap();
    let mut trainer = Trainer::new(3, 0.01).unwrap().with_cancel(cancel.clone());

    assert!(cancel.is_cancelled());
    assert!(matches!(
        trainer.fit(&mut model, &scaled_wave(10)),
        Err(ForecastError::Cancelled)
    ));
    assert_eq!(trainer.state(), TrainingState::Failed);
}

#[test]
fn test_sequence_config_validation() {
    assert!(SequenceModelConfig::default().validate().is_ok());

    let invalid = [
        SequenceModelConfig {
            window_size: 0,
            ..Default::default()
        },
        SequenceModelConfig {
            epochs: 0,
            ..Default::default()
        },
        SequenceModelConfig {
            learning_rate: -0.1,
            ..Default::default()
        },
        SequenceModelConfig {
            gradient_clip: Some(0.0),
            ..Default::default()
        },
    ];

    for config in invalid {
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    assert!(Trainer::new(0, 0.1).is_err());
    assert!(Trainer::new(1, f64::NAN).is_err());
}
