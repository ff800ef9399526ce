//! User-facing text for every report section

use crate::error::BotError;
use crate::news::Headline;
use forecast_trade::{
    ForecastError, PredictionResult, StrategyKind, Suggestion, TrendDirection, TrendReport,
};
use std::fmt;

/// One independently computed part of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Price,
    Trend,
    Forecast(StrategyKind),
    Suggestion,
    News,
}

impl Section {
    /// Sections of the full report, in display order
    pub const FULL: [Section; 5] = [
        Section::Price,
        Section::Trend,
        Section::Forecast(StrategyKind::SequenceModel),
        Section::Suggestion,
        Section::News,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Price => write!(f, "price"),
            Section::Trend => write!(f, "trend"),
            Section::Forecast(_) => write!(f, "forecast"),
            Section::Suggestion => write!(f, "suggestion"),
            Section::News => write!(f, "news"),
        }
    }
}

pub const WELCOME_TEXT: &str = "👋 Welcome to Price Owl!\n\
    Choose an option below or send a ticker (e.g., BTC, AAPL) for a full report:\n\
    💰 Price | 🔮 Predict | 📊 Trend | 🧠 AI Suggest | ℹ️ Help";

pub const HELP_TEXT: &str = "📘 Commands:\n\
    - 💰 Price: Enter a symbol (e.g., BTC, AAPL)\n\
    - 🔮 Predict: Trains the sequence model and forecasts the next close\n\
    - 📊 Trend: Analyzes the last 7 days\n\
    - 🧠 AI Suggest: Simple buy/avoid idea against the 10-day average\n\
    - Any symbol on its own: full report";

pub const INVALID_TEXT: &str = "❓ Invalid input. Type /start to choose again.";

pub fn format_price(symbol: &str, price: f64) -> String {
    format!("💰 {} Price: ${:.2}", symbol, price)
}

pub fn format_trend(trend: &TrendReport) -> String {
    match trend.direction {
        TrendDirection::Up => format!(
            "📈 Market Trend for {}: UP (${:.2} gain)",
            trend.symbol, trend.period_delta
        ),
        TrendDirection::Down => format!(
            "📉 Market Trend for {}: DOWN (${:.2} loss)",
            trend.symbol,
            trend.period_delta.abs()
        ),
        TrendDirection::Flat => format!("➖ Market Trend for {}: FLAT (no change)", trend.symbol),
    }
}

pub fn format_suggestion(symbol: &str, suggestion: Suggestion) -> String {
    match suggestion {
        Suggestion::Buy => format!("✅ AI Suggestion: Consider Buying {}", symbol),
        Suggestion::Avoid => format!("❌ AI Suggestion: Avoid Buying {} for now", symbol),
    }
}

pub fn format_prediction(result: &PredictionResult) -> String {
    let headline = match (result.estimated_next_value(), result.signal()) {
        (Some(value), _) => format!(
            "🔮 {} Predicted Price for {}: ${:.2}",
            strategy_label(result.strategy_used()),
            result.symbol(),
            value
        ),
        (None, Some(signal)) => format_suggestion(result.symbol(), signal),
        (None, None) => format!("🔮 No estimate for {}", result.symbol()),
    };

    if result.confidence_note().is_empty() {
        headline
    } else {
        format!("{}\n   {}", headline, result.confidence_note())
    }
}

pub fn format_headlines(symbol: &str, headlines: &[Headline]) -> String {
    if headlines.is_empty() {
        return format!("📰 No recent headlines for {}", symbol);
    }
    let mut out = format!("📰 Headlines for {}:", symbol);
    for headline in headlines {
        out.push_str("\n- ");
        out.push_str(&headline.title);
    }
    out
}

fn strategy_label(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::SequenceModel => "LSTM",
        StrategyKind::NaiveDelta => "Naive",
        StrategyKind::MeanReversion => "Mean-reversion",
    }
}

/// Error line shown in place of a failed section
pub fn format_error(section: Section, err: &BotError) -> String {
    match err {
        BotError::Forecast(ForecastError::InsufficientHistory {
            required,
            available,
        }) => format!(
            "⚠️ Not enough data for {} ({} of {} points).",
            section, available, required
        ),
        BotError::Forecast(ForecastError::DataUnavailable { symbol, .. }) => {
            format!("⚠️ Could not fetch {} data for {}.", section, symbol)
        }
        BotError::Forecast(ForecastError::TrainingDiverged { .. }) => {
            "❌ Forecast failed: the model did not converge.".to_string()
        }
        BotError::Forecast(ForecastError::Cancelled) | BotError::Timeout(_) => {
            "⏱️ Forecast timed out.".to_string()
        }
        other => format!("❌ {} failed: {}", capitalize(&section.to_string()), other),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
