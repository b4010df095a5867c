use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use layaway_core::point::RawPricePoint;
use layaway_core::series::{LOOKBACK_DAYS, SAMPLE_INTERVAL_MS, SYMBOL};

use crate::error::OracleError;

/// A historical price query: one symbol sampled over `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub symbol: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sampling interval in milliseconds.
    pub interval_ms: i64,
}

impl HistoricalQuery {
    /// The dashboard's fixed query: BTC, hourly, over the week ending `now`.
    pub fn trailing_week(now: DateTime<Utc>) -> Self {
        Self {
            symbol: SYMBOL.to_string(),
            start: now - Duration::days(LOOKBACK_DAYS),
            end: now,
            interval_ms: SAMPLE_INTERVAL_MS,
        }
    }
}

/// Source of historical price observations.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Oracle name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch the observations matching `query`. Ordering is not guaranteed.
    async fn historical_prices(
        &self,
        query: &HistoricalQuery,
    ) -> Result<Vec<RawPricePoint>, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_week_query() {
        let now = DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let query = HistoricalQuery::trailing_week(now);

        assert_eq!(query.symbol, "BTC");
        assert_eq!(query.end, now);
        assert_eq!(query.start.to_rfc3339(), "2025-01-08T12:00:00+00:00");
        assert_eq!(query.interval_ms, 3_600_000);
    }
}
