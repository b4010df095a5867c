use async_trait::async_trait;
use layaway_core::point::RawPricePoint;
use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use tracing::debug;

use crate::error::OracleError;
use crate::oracle::{HistoricalQuery, PriceOracle};

const REDSTONE_API_URL: &str = "https://api.redstone.finance";
const DEFAULT_PROVIDER: &str = "redstone";
/// Back-off used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// RedStone price oracle, queried through its public HTTP API.
/// No authentication required.
pub struct RedStoneOracle {
    client: Client,
    base_url: String,
    provider: String,
}

impl RedStoneOracle {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: REDSTONE_API_URL.to_string(),
            provider: DEFAULT_PROVIDER.to_string(),
        }
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            provider: DEFAULT_PROVIDER.to_string(),
        }
    }

    fn prices_url(&self) -> String {
        format!("{}/prices", self.base_url.trim_end_matches('/'))
    }
}

impl Default for RedStoneOracle {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of the `/prices` response. The API also returns `id`,
/// `symbol`, `provider`, `permawebTx`, `source` and signature fields,
/// none of which the chart reads.
#[derive(Debug, Deserialize)]
struct RedStonePrice {
    value: f64,
    timestamp: i64,
}

fn parse_prices(body: &str) -> Result<Vec<RawPricePoint>, OracleError> {
    let prices: Vec<RedStonePrice> = serde_json::from_str(body)
        .map_err(|e| OracleError::Parse(format!("failed to parse response: {e}")))?;

    Ok(prices
        .into_iter()
        .map(|p| RawPricePoint {
            value: p.value,
            timestamp: p.timestamp,
        })
        .collect())
}

/// Seconds to wait before retrying, from a delta-seconds `Retry-After`.
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Query parameters for the historical-price endpoint.
fn query_params(query: &HistoricalQuery, provider: &str) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", query.symbol.clone()),
        ("provider", provider.to_string()),
        ("fromTimestamp", query.start.timestamp_millis().to_string()),
        ("toTimestamp", query.end.timestamp_millis().to_string()),
        ("interval", query.interval_ms.to_string()),
    ]
}

#[async_trait]
impl PriceOracle for RedStoneOracle {
    fn name(&self) -> &str {
        "redstone"
    }

    async fn historical_prices(
        &self,
        query: &HistoricalQuery,
    ) -> Result<Vec<RawPricePoint>, OracleError> {
        let url = self.prices_url();
        debug!(
            "Fetching {} prices from {url} ({} to {})",
            query.symbol, query.start, query.end
        );

        let response = self
            .client
            .get(&url)
            .query(&query_params(query, &self.provider))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OracleError::RateLimited {
                retry_after_secs: retry_after_secs(response.headers()),
            });
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status,
                message: body,
            });
        }

        let body = response.text().await?;
        parse_prices(&body)
    }
}
