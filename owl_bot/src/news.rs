//! Headlines for a ticker

use crate::http::blocking_client;
use forecast_trade::{ForecastError, Result};
use reqwest::blocking::Client;
use rss::Channel;
use std::io::Cursor;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub link: Option<String>,
}

/// Source of recent headlines. Blocking, like [`forecast_trade::MarketDataProvider`].
pub trait NewsProvider: Send + Sync {
    fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<Headline>>;
}

/// RSS feed whose URL contains a `{symbol}` placeholder
#[derive(Debug)]
pub struct RssNews {
    url_template: String,
    timeout: Duration,
    client: OnceLock<std::result::Result<Client, String>>,
}

impl RssNews {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url_template: url_template.into(),
            timeout,
            client: OnceLock::new(),
        }
    }

    pub fn feed_url(&self, symbol: &str) -> String {
        self.url_template.replace("{symbol}", symbol)
    }
}

impl NewsProvider for RssNews {
    fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<Headline>> {
        let client = self
            .client
            .get_or_init(|| blocking_client(self.timeout))
            .as_ref()
            .map_err(|e| ForecastError::unavailable(symbol, e))?;

        let url = self.feed_url(symbol);
        debug!(symbol, url = %url, "fetching headlines");
        let response = client
            .get(&url)
            .send()
            .map_err(|e| ForecastError::unavailable(symbol, e))?;
        if !response.status().is_success() {
            return Err(ForecastError::unavailable(
                symbol,
                format!("HTTP {}", response.status()),
            ));
        }
        let bytes = response
            .bytes()
            .map_err(|e| ForecastError::unavailable(symbol, e))?;

        parse_headlines(&bytes, limit).map_err(|e| ForecastError::unavailable(symbol, e))
    }
}

/// Titles of the first `limit` feed items, untitled items skipped
pub fn parse_headlines(feed: &[u8], limit: usize) -> std::result::Result<Vec<Headline>, rss::Error> {
    let channel = Channel::read_from(Cursor::new(feed))?;
    Ok(channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            (!title.is_empty()).then(|| Headline {
                title: title.to_string(),
                link: item.link().map(str::to_string),
            })
        })
        .take(limit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Markets</title><link>https://news.test</link><description>d</description>
<item><title>Bitcoin climbs past resistance</title><link>https://news.test/1</link></item>
<item><description>no title here</description></item>
<item><title>ETF inflows slow</title></item>
<item><title>Miners rotate holdings</title><link>https://news.test/3</link></item>
</channel></rss>"#;

    #[test]
    fn test_parse_headlines_limit_and_untitled() {
        let headlines = parse_headlines(FEED.as_bytes(), 2).unwrap();

        assert_eq!(
            headlines,
            vec![
                Headline {
                    title: "Bitcoin climbs past resistance".to_string(),
                    link: Some("https://news.test/1".to_string()),
                },
                Headline {
                    title: "ETF inflows slow".to_string(),
                    link: None,
                },
            ]
        );
    }

    #[test]
    fn test_parse_headlines_rejects_garbage() {
        assert!(parse_headlines(b"not a feed", 3).is_err());
    }

    #[test]
    fn test_feed_url_substitution() {
        let news = RssNews::new("https://feeds.test/rss?s={symbol}&region=US", Duration::from_secs(1));
        assert_eq!(news.feed_url("AAPL"), "https://feeds.test/rss?s=AAPL&region=US");
    }
}
