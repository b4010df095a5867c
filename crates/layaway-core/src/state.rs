use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::ChartError;
use crate::point::{ChartPoint, RawPricePoint};
use crate::render;
use crate::series::{self, DerivedStats};

/// Everything the chart view needs from one successful acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub points: Vec<ChartPoint>,
    pub stats: DerivedStats,
    pub fetched_at: DateTime<Utc>,
}

impl ChartSnapshot {
    /// Derive points and stats from a freshly fetched raw series.
    /// The raw series replaces whatever was shown before; nothing is merged.
    pub fn from_raw(
        raw: &[RawPricePoint],
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Self, ChartError> {
        let points = series::derive(raw, tz)?;
        let stats = series::compute_stats(&points, now);
        Ok(Self {
            points,
            stats,
            fetched_at: now,
        })
    }
}

/// Observable state of the price widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WidgetState {
    /// No acquisition has completed yet.
    #[default]
    Loading,
    /// The last acquisition failed.
    Error(String),
    /// The last acquisition succeeded (possibly with an empty series).
    Ready(ChartSnapshot),
}

impl WidgetState {
    pub fn is_loading(&self) -> bool {
        matches!(self, WidgetState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WidgetState::Error(_))
    }

    pub fn snapshot(&self) -> Option<&ChartSnapshot> {
        match self {
            WidgetState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// SVG document for the current state.
    pub fn render_svg(&self, tz: Tz) -> String {
        match self {
            WidgetState::Loading => render::render_loading(),
            WidgetState::Error(_) => render::render_error(),
            WidgetState::Ready(snapshot) => render::render(&snapshot.points, &snapshot.stats, tz),
        }
    }

    /// Single-line text summary for terminals and logs.
    pub fn headline(&self) -> String {
        match self {
            WidgetState::Loading => "Loading...".to_string(),
            WidgetState::Error(_) => render::ERROR_MESSAGE.to_string(),
            WidgetState::Ready(snapshot) => snapshot.stats.headline(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(series::CHANGE_WINDOW_MS).unwrap()
    }

    #[test]
    fn snapshot_from_unordered_raw() {
        let raw = [
            RawPricePoint {
                value: 110.0,
                timestamp: series::CHANGE_WINDOW_MS,
            },
            RawPricePoint {
                value: 100.0,
                timestamp: 0,
            },
        ];
        let snapshot = ChartSnapshot::from_raw(&raw, Tz::UTC, now()).unwrap();

        assert_eq!(snapshot.points[0].price, 100.0);
        assert_eq!(snapshot.stats.current_price, "$110.00");
        assert!((snapshot.stats.percent_change_window - 10.0).abs() < 1e-9);
        assert_eq!(snapshot.fetched_at, now());
    }

    #[test]
    fn empty_result_is_ready_not_error() {
        let state = WidgetState::Ready(ChartSnapshot::from_raw(&[], Tz::UTC, now()).unwrap());
        assert!(!state.is_error());
        assert!(state.headline().starts_with("N/A"));
        assert!(state.render_svg(Tz::UTC).contains(">N/A</text>"));
    }

    #[test]
    fn default_is_loading() {
        let state = WidgetState::default();
        assert!(state.is_loading());
        assert!(state.snapshot().is_none());
        assert!(state.render_svg(Tz::UTC).contains("Loading"));
    }

    #[test]
    fn error_renders_static_message() {
        let state = WidgetState::Error("connection refused".to_string());
        assert_eq!(state.headline(), render::ERROR_MESSAGE);
        assert!(!state.render_svg(Tz::UTC).contains("connection refused"));
    }
}
