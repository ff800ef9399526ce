//! Closing-price history for a single symbol

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered closing prices of one symbol, oldest first
///
/// A history always holds at least one finite, positive price and is never
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceHistory")]
pub struct PriceHistory {
    symbol: String,
    closes: Vec<f64>,
    timestamps: Option<Vec<DateTime<Utc>>>,
}

/// Unchecked wire form, validated on the way in
#[derive(Debug, Deserialize)]
struct RawPriceHistory {
    symbol: String,
    closes: Vec<f64>,
    #[serde(default)]
    timestamps: Option<Vec<DateTime<Utc>>>,
}

impl TryFrom<RawPriceHistory> for PriceHistory {
    type Error = ForecastError;

    fn try_from(raw: RawPriceHistory) -> Result<Self> {
        match raw.timestamps {
            None => Self::new(raw.symbol, raw.closes),
            Some(timestamps) => {
                if timestamps.len() != raw.closes.len() {
                    return Err(ForecastError::DataError(format!(
                        "{} timestamps for {} closes",
                        timestamps.len(),
                        raw.closes.len()
                    )));
                }
                let points = timestamps.into_iter().zip(raw.closes).collect();
                Self::with_timestamps(raw.symbol, points)
            }
        }
    }
}

impl PriceHistory {
    /// Create a history from closes alone
    pub fn new(symbol: impl Into<String>, closes: Vec<f64>) -> Result<Self> {
        Self::validate_closes(&closes)?;

        Ok(Self {
            symbol: normalize_symbol(&symbol.into()),
            closes,
            timestamps: None,
        })
    }

    /// Create a history from `(timestamp, close)` points
    ///
    /// Timestamps must be strictly increasing.
    pub fn with_timestamps(
        symbol: impl Into<String>,
        points: Vec<(DateTime<Utc>, f64)>,
    ) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
            return Err(ForecastError::DataError(format!(
                "Timestamps must be strictly increasing ({} follows {})",
                pair[1].0, pair[0].0
            )));
        }

        let (timestamps, closes): (Vec<_>, Vec<_>) = points.into_iter().unzip();
        Self::validate_closes(&closes)?;

        Ok(Self {
            symbol: normalize_symbol(&symbol.into()),
            closes,
            timestamps: Some(timestamps),
        })
    }

    fn validate_closes(closes: &[f64]) -> Result<()> {
        if closes.is_empty() {
            return Err(ForecastError::InsufficientHistory {
                required: 1,
                available: 0,
            });
        }

        if let Some((i, v)) = closes
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v <= 0.0)
        {
            return Err(ForecastError::DataError(format!(
                "Invalid close price {} at position {}",
                v, i
            )));
        }

        Ok(())
    }

    /// Upper-cased ticker
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Closing prices, oldest first
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Timestamps aligned with [`closes`](Self::closes), if known
    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Oldest close
    pub fn first(&self) -> f64 {
        self.closes[0]
    }

    /// Most recent close
    pub fn latest(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }

    /// The most recent `n` points (the whole history when `n >= len`)
    pub fn tail(&self, n: usize) -> PriceHistory {
        let start = self.closes.len().saturating_sub(n.max(1));

        PriceHistory {
            symbol: self.symbol.clone(),
            closes: self.closes[start..].to_vec(),
            timestamps: self.timestamps.as_ref().map(|ts| ts[start..].to_vec()),
        }
    }

    /// Require at least `required` points
    pub fn ensure_len(&self, required: usize) -> Result<()> {
        if self.closes.len() < required {
            return Err(ForecastError::InsufficientHistory {
                required,
                available: self.closes.len(),
            });
        }
        Ok(())
    }
}

/// Tickers are compared upper-cased and trimmed
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
