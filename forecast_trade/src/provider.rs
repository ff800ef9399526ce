//! Market data collaborators
//!
//! The forecasting core never talks to the network itself. It asks a
//! [`MarketDataProvider`] for a close series and treats every failure as
//! [`ForecastError::DataUnavailable`].

use crate::data::{normalize_symbol, PriceHistory};
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Source of historical closes
pub trait MarketDataProvider: Send + Sync {
    /// Closes of `symbol` covering roughly the last `period_days` days
    fn fetch_close_series(&self, symbol: &str, period_days: usize) -> Result<PriceHistory>;

    /// Latest traded price
    fn fetch_spot_price(&self, symbol: &str) -> Result<f64> {
        Ok(self.fetch_close_series(symbol, 1)?.latest())
    }
}

/// Provider backed by histories held in memory
///
/// `period_days` is interpreted as a count of trailing points.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, PriceHistory>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the history of its symbol
    pub fn with_history(mut self, history: PriceHistory) -> Self {
        self.insert(history);
        self
    }

    pub fn insert(&mut self, history: PriceHistory) {
        self.series.insert(history.symbol().to_string(), history);
    }

    /// Known symbols, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn fetch_close_series(&self, symbol: &str, period_days: usize) -> Result<PriceHistory> {
        let key = normalize_symbol(symbol);
        self.series
            .get(&key)
            .map(|history| history.tail(period_days))
            .ok_or_else(|| ForecastError::unavailable(key, "unknown symbol"))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    date: NaiveDate,
    close: f64,
}

/// Provider reading `symbol,date,close` rows from a CSV file
///
/// Rows may appear in any order; each symbol is sorted by date on load.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    inner: InMemoryProvider,
}

impl CsvProvider {
    /// Load every row of `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut grouped: HashMap<String, BTreeMap<NaiveDate, f64>> = HashMap::new();

        for row in reader.deserialize() {
            let row: CsvRow = row?;
            let dates = grouped.entry(normalize_symbol(&row.symbol)).or_default();
            if dates.insert(row.date, row.close).is_some() {
                return Err(ForecastError::DataError(format!(
                    "Duplicate date {} for {}",
                    row.date, row.symbol
                )));
            }
        }

        let mut inner = InMemoryProvider::new();
        for (symbol, rows) in grouped {
            let points = rows
                .into_iter()
                .map(|(date, close)| {
                    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
                    (Utc.from_utc_datetime(&midnight), close)
                })
                .collect();
            inner.insert(PriceHistory::with_timestamps(symbol, points)?);
        }

        debug!(symbols = ?inner.symbols(), "csv market data loaded");
        Ok(Self { inner })
    }

    pub fn symbols(&self) -> Vec<String> {
        self.inner.symbols()
    }
}

impl MarketDataProvider for CsvProvider {
    fn fetch_close_series(&self, symbol: &str, period_days: usize) -> Result<PriceHistory> {
        self.inner.fetch_close_series(symbol, period_days)
    }
}
