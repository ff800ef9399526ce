//! Live market data over HTTP
//!
//! Crypto tickers with a known CoinGecko id are served from CoinGecko, every
//! other ticker from Yahoo's chart endpoint. All calls are blocking and must
//! run on a worker thread, never on the async executor.

use crate::config::BotConfig;
use chrono::{TimeZone, Utc};
use forecast_trade::{ForecastError, MarketDataProvider, PriceHistory, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("owl_bot/", env!("CARGO_PKG_VERSION"));

/// CoinGecko id for the crypto tickers the bot knows about
pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    let id = match symbol {
        "BTC" => "bitcoin",
        "ETH" => "ethereum",
        "SOL" => "solana",
        "DOGE" => "dogecoin",
        "ADA" => "cardano",
        "XRP" => "ripple",
        "LTC" => "litecoin",
        "BNB" => "binancecoin",
        "DOT" => "polkadot",
        _ => return None,
    };
    Some(id)
}

/// Build a blocking client; construction is deferred until first use so it
/// happens on a worker thread.
pub(crate) fn blocking_client(timeout: Duration) -> std::result::Result<Client, String> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| e.to_string())
}

#[derive(Debug)]
pub struct HttpMarketData {
    coingecko_url: String,
    yahoo_url: String,
    timeout: Duration,
    client: OnceLock<std::result::Result<Client, String>>,
}

impl HttpMarketData {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            coingecko_url: config.coingecko_url.trim_end_matches('/').to_string(),
            yahoo_url: config.yahoo_url.trim_end_matches('/').to_string(),
            timeout: config.http_timeout,
            client: OnceLock::new(),
        }
    }

    fn get_text(&self, symbol: &str, url: &str, query: &[(&str, String)]) -> Result<String> {
        let client = self
            .client
            .get_or_init(|| blocking_client(self.timeout))
            .as_ref()
            .map_err(|e| ForecastError::unavailable(symbol, e))?;

        debug!(symbol, url, "requesting market data");
        let response = client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| ForecastError::unavailable(symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::unavailable(symbol, format!("HTTP {}", status)));
        }
        response
            .text()
            .map_err(|e| ForecastError::unavailable(symbol, e))
    }
}

impl MarketDataProvider for HttpMarketData {
    fn fetch_close_series(&self, symbol: &str, period_days: usize) -> Result<PriceHistory> {
        match coingecko_id(symbol) {
            Some(id) => {
                let url = format!("{}/coins/{}/market_chart", self.coingecko_url, id);
                let body = self.get_text(
                    symbol,
                    &url,
                    &[
                        ("vs_currency", "usd".to_string()),
                        ("days", period_days.to_string()),
                        ("interval", "daily".to_string()),
                    ],
                )?;
                parse_market_chart(symbol, &body)
            }
            None => {
                let now = Utc::now().timestamp();
                // calendar days, so weekends eat into the window
                let start = now - 86_400 * period_days.max(1) as i64;
                let url = format!("{}/v8/finance/chart/{}", self.yahoo_url, symbol);
                let body = self.get_text(
                    symbol,
                    &url,
                    &[
                        ("period1", start.to_string()),
                        ("period2", now.to_string()),
                        ("interval", "1d".to_string()),
                    ],
                )?;
                parse_yahoo_chart(symbol, &body)
            }
        }
    }

    fn fetch_spot_price(&self, symbol: &str) -> Result<f64> {
        match coingecko_id(symbol) {
            Some(id) => {
                let url = format!("{}/simple/price", self.coingecko_url);
                let body = self.get_text(
                    symbol,
                    &url,
                    &[("ids", id.to_string()), ("vs_currencies", "usd".to_string())],
                )?;
                parse_simple_price(symbol, id, &body)
            }
            // a one-day range is empty over weekends
            None => Ok(self.fetch_close_series(symbol, 5)?.latest()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct YahooEnvelope {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Build a history from `(timestamp, close)` points, skipping repeated timestamps.
fn history_from_points(
    symbol: &str,
    points: impl IntoIterator<Item = (chrono::DateTime<Utc>, f64)>,
) -> Result<PriceHistory> {
    let mut deduped: Vec<(chrono::DateTime<Utc>, f64)> = Vec::new();
    for (ts, close) in points {
        if deduped.last().map_or(true, |(prev, _)| *prev < ts) {
            deduped.push((ts, close));
        }
    }
    if deduped.is_empty() {
        return Err(ForecastError::unavailable(symbol, "no closes returned"));
    }
    PriceHistory::with_timestamps(symbol, deduped)
        .map_err(|e| ForecastError::unavailable(symbol, e))
}

pub(crate) fn parse_market_chart(symbol: &str, body: &str) -> Result<PriceHistory> {
    let chart: MarketChart = serde_json::from_str(body)
        .map_err(|e| ForecastError::unavailable(symbol, format!("malformed response: {}", e)))?;

    let points = chart.prices.into_iter().filter_map(|(millis, price)| {
        Utc.timestamp_millis_opt(millis as i64)
            .single()
            .map(|ts| (ts, price))
    });
    history_from_points(symbol, points)
}

pub(crate) fn parse_yahoo_chart(symbol: &str, body: &str) -> Result<PriceHistory> {
    let envelope: YahooEnvelope = serde_json::from_str(body)
        .map_err(|e| ForecastError::unavailable(symbol, format!("malformed response: {}", e)))?;

    if let Some(error) = envelope.chart.error {
        return Err(ForecastError::unavailable(symbol, error.description));
    }
    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ForecastError::unavailable(symbol, "empty chart result"))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let points = result
        .timestamp
        .into_iter()
        .zip(closes)
        .filter_map(|(secs, close)| {
            let close = close?;
            Utc.timestamp_opt(secs, 0).single().map(|ts| (ts, close))
        });
    history_from_points(symbol, points)
}

pub(crate) fn parse_simple_price(symbol: &str, id: &str, body: &str) -> Result<f64> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ForecastError::unavailable(symbol, format!("malformed response: {}", e)))?;
    value
        .get(id)
        .and_then(|entry| entry.get("usd"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| ForecastError::unavailable(symbol, "no USD quote"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coingecko_ids() {
        assert_eq!(coingecko_id("BTC"), Some("bitcoin"));
        assert_eq!(coingecko_id("AAPL"), None);
    }

    #[test]
    fn test_parse_market_chart() {
        let body = r#"{"prices":[[1700000000000,100.5],[1700086400000,101.0],[1700086400000,101.0],[1700100000000,102.25]],
                       "market_caps":[],"total_volumes":[]}"#;
        let history = parse_market_chart("BTC", body).unwrap();

        assert_eq!(history.closes(), &[100.5, 101.0, 102.25]);
        assert_eq!(history.timestamps().map(|ts| ts.len()), Some(3));
    }

    #[test]
    fn test_parse_market_chart_empty() {
        let err = parse_market_chart("BTC", r#"{"prices":[]}"#).unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable { .. }));
    }

    #[test]
    fn test_parse_yahoo_chart_skips_null_closes() {
        let body = r#"{"chart":{"result":[{"meta":{"currency":"USD"},
            "timestamp":[1700000000,1700086400,1700172800],
            "indicators":{"quote":[{"close":[189.5,null,191.25]}]}}],"error":null}}"#;
        let history = parse_yahoo_chart("AAPL", body).unwrap();

        assert_eq!(history.symbol(), "AAPL");
        assert_eq!(history.closes(), &[189.5, 191.25]);
    }

    #[test]
    fn test_parse_yahoo_chart_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match parse_yahoo_chart("ZZZZ", body).unwrap_err() {
            ForecastError::DataUnavailable { symbol, reason } => {
                assert_eq!(symbol, "ZZZZ");
                assert!(reason.contains("delisted"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_yahoo_chart("AAPL", "<html>").unwrap_err(),
            ForecastError::DataUnavailable { .. }
        ));
    }

    #[test]
    fn test_parse_simple_price() {
        let body = r#"{"bitcoin":{"usd":64123.45}}"#;
        assert_eq!(parse_simple_price("BTC", "bitcoin", body).unwrap(), 64123.45);
        assert!(parse_simple_price("ETH", "ethereum", body).is_err());
    }
}
