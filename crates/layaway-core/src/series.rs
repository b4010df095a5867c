use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ChartError;
use crate::format;
use crate::point::{ChartPoint, RawPricePoint};

/// Asset queried from the oracle.
pub const SYMBOL: &str = "BTC";

/// Lookback window for the historical query.
pub const LOOKBACK_DAYS: i64 = 7;

/// Sampling interval requested from the oracle (1 hour).
pub const SAMPLE_INTERVAL_MS: i64 = 3_600_000;

/// Trailing window for the percent-change indicator (24 hours).
pub const CHANGE_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Sentinel shown when the series is empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// Headline figures derived from a chart series.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    /// Latest price as a USD string, or `N/A`.
    pub current_price: String,
    /// Signed percent change over the trailing change window.
    pub percent_change_window: f64,
}

impl DerivedStats {
    pub fn is_up(&self) -> bool {
        self.percent_change_window >= 0.0
    }

    pub fn arrow(&self) -> &'static str {
        if self.is_up() { "↑" } else { "↓" }
    }

    /// `+2.31%`
    pub fn change_text(&self) -> String {
        format::signed_percent(self.percent_change_window)
    }

    /// One-line summary, e.g. `$67,432.10  +2.31% ↑  BTC/USD`.
    pub fn headline(&self) -> String {
        format!(
            "{}  {} {}  {SYMBOL}/USD",
            self.current_price,
            self.change_text(),
            self.arrow()
        )
    }
}

/// Sort a raw oracle series by timestamp and attach display labels.
///
/// The sort is stable, so points sharing a timestamp keep the order the
/// oracle returned them in. Output length always equals input length.
pub fn derive(raw: &[RawPricePoint], tz: Tz) -> Result<Vec<ChartPoint>, ChartError> {
    let mut sorted = raw.to_vec();
    sorted.sort_by_key(|p| p.timestamp);

    sorted
        .into_iter()
        .map(|p| {
            Ok(ChartPoint {
                timestamp: p.timestamp,
                price: p.value,
                label: point_label(p.timestamp, tz)?,
            })
        })
        .collect()
}

/// `1/15/2025 12:07` in the given zone.
pub fn point_label(timestamp_ms: i64, tz: Tz) -> Result<String, ChartError> {
    let local = tz
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .ok_or(ChartError::TimestampOutOfRange(timestamp_ms))?;
    Ok(local.format("%-m/%-d/%Y %-H:%M").to_string())
}

/// Compute the headline price and trailing percent change.
///
/// The reference price is the latest point at or before `now - 24h`,
/// falling back to the earliest point. A zero reference price yields 0%.
pub fn compute_stats(points: &[ChartPoint], now: DateTime<Utc>) -> DerivedStats {
    let Some(latest) = points.last() else {
        return DerivedStats {
            current_price: NOT_AVAILABLE.to_string(),
            percent_change_window: 0.0,
        };
    };

    let cutoff = now.timestamp_millis() - CHANGE_WINDOW_MS;
    let reference = points
        .iter()
        .rev()
        .find(|p| p.timestamp <= cutoff)
        .unwrap_or(&points[0])
        .price;

    let percent_change_window = if reference == 0.0 {
        0.0
    } else {
        (latest.price - reference) / reference * 100.0
    };

    DerivedStats {
        current_price: format::usd(latest.price),
        percent_change_window,
    }
}
