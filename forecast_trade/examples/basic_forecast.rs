use chrono::{Duration, TimeZone, Utc};
use forecast_trade::models::{LstmModel, SequenceModel, Trainer};
use forecast_trade::{
    InMemoryProvider, Predictor, PredictorConfig, PriceHistory, SignalAggregator, SignalConfig,
    StrategyKind,
};
use std::sync::Arc;
use trade_math::MinMaxScaler;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Forecast Trade: Basic Forecasting Example");
    println!("=========================================\n");

    let history = create_sample_daily_data()?;
    println!(
        "Sample data created: {} daily closes for {}\n",
        history.len(),
        history.symbol()
    );

    let provider = Arc::new(InMemoryProvider::new().with_history(history.clone()));
    let predictor = Predictor::new(provider.clone(), PredictorConfig::default())?;

    println!("Estimates for the next close:");
    for kind in StrategyKind::ALL {
        let result = predictor.predict("acme", kind, None)?;
        match (result.estimated_next_value(), result.signal()) {
            (Some(value), _) => println!("  {:<15} {:>8.2}", kind.as_str(), value),
            (None, Some(signal)) => {
                println!("  {:<15} {:>8}", kind.as_str(), format!("{:?}", signal))
            }
            (None, None) => println!("  {:<15} {:>8}", kind.as_str(), "-"),
        }
        println!("  {:<15} {}", "", result.confidence_note());
    }

    // Train by hand to look at the loss curve
    let (scaled, _) = MinMaxScaler::fit_transform(history.closes())?;
    let mut model = LstmModel::new(30, 16, 7)?;
    let mut trainer = Trainer::new(10, 0.01)?;
    let report = trainer.fit(&mut model, &scaled)?;

    println!("\n{} loss per epoch:", model.name());
    for (epoch, loss) in report.loss_history.iter().enumerate() {
        println!("  Epoch {:>2}: {:.6}", epoch + 1, loss);
    }

    let signals = SignalAggregator::new(provider, SignalConfig::default());
    let summary = signals.aggregate("ACME")?;
    println!(
        "\nSignals: price {:.2}, trend {} ({:+.2}), suggestion {:?}",
        summary.current_price, summary.trend.direction, summary.trend.period_delta, summary.suggestion
    );

    Ok(())
}

/// Create sample daily data with a trend and some seasonality
fn create_sample_daily_data() -> forecast_trade::Result<PriceHistory> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let points = (0..90)
        .map(|day| {
            let trend = 100.0 + day as f64 * 0.4;
            let season = 3.0 * (day as f64 * std::f64::consts::TAU / 14.0).sin();
            (start + Duration::days(day), trend + season)
        })
        .collect();
    PriceHistory::with_timestamps("ACME", points)
}
