//! Yahoo Finance chart API price source
//!
//! Hits `GET {base}/v8/finance/chart/{ticker}` and pulls
//! `chart.result[0].meta.regularMarketPrice` out of the response. Yahoo
//! sometimes returns nulls in that path, so every level is optional.

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::PriceSource;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo rejects requests without a browser-looking User-Agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment override for the quote endpoint, used by tests
pub const QUOTE_URL_ENV: &str = "STOCKFOLIO_QUOTE_URL";

pub struct YahooPriceSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<Decimal>,
}

impl YahooPriceSource {
    /// Create a price source against the default Yahoo endpoint, honoring
    /// the environment override when set
    pub fn new() -> Self {
        let base_url =
            std::env::var(QUOTE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn fetch(&self, ticker: &str) -> Option<Decimal> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(ticker, "Network error fetching price: {}", e);
                return None;
            }
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!(ticker, "Yahoo is rate-limiting price requests");
            return None;
        }

        if !response.status().is_success() {
            warn!(ticker, status = %response.status(), "Error fetching price");
            return None;
        }

        let payload: ChartResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(ticker, "Malformed price payload: {}", e);
                return None;
            }
        };

        let price = payload
            .chart
            .and_then(|chart| chart.result)
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .and_then(|result| result.meta)
            .and_then(|meta| meta.regular_market_price);

        match price {
            Some(price) => debug!(ticker, %price, "Fetched live price"),
            None => warn!(ticker, "No price data available for ticker"),
        }

        price
    }
}
