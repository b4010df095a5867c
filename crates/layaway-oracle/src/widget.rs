use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use layaway_core::point::RawPricePoint;
use layaway_core::state::{ChartSnapshot, WidgetState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::error::OracleError;
use crate::oracle::{HistoricalQuery, PriceOracle};

/// How often an active widget re-acquires the price series.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Polls a [`PriceOracle`] and publishes chart state to subscribers.
///
/// State starts as [`WidgetState::Loading`] and returns to it whenever a
/// cycle begins before any cycle has succeeded. Every completed cycle
/// publishes either `Ready` or `Error`; there is no retry within a cycle, the
/// next tick simply tries again.
pub struct PriceSeriesWidget {
    oracle: Arc<dyn PriceOracle>,
    tz: Tz,
    state: watch::Sender<WidgetState>,
    succeeded: AtomicBool,
}

impl PriceSeriesWidget {
    pub fn new(oracle: Arc<dyn PriceOracle>, tz: Tz) -> Self {
        let (state, _) = watch::channel(WidgetState::Loading);
        Self {
            oracle,
            tz,
            state,
            succeeded: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }

    /// Current state (cloned).
    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    /// Fetch the trailing week of hourly prices ending at `now`.
    pub async fn acquire(&self, now: DateTime<Utc>) -> Result<Vec<RawPricePoint>, OracleError> {
        let query = HistoricalQuery::trailing_week(now);
        self.oracle.historical_prices(&query).await
    }

    /// Run one acquire/derive cycle and publish the outcome.
    pub async fn refresh(&self) {
        // Until the first success, an in-flight cycle shows as loading.
        let succeeded = self.succeeded.load(Ordering::Acquire);
        self.state.send_if_modified(|state| {
            if !succeeded && state.is_error() {
                *state = WidgetState::Loading;
                true
            } else {
                false
            }
        });

        let now = Utc::now();
        let outcome = match self.acquire(now).await {
            Ok(raw) => ChartSnapshot::from_raw(&raw, self.tz, now).map_err(OracleError::from),
            Err(e) => Err(e),
        };

        let next = match outcome {
            Ok(snapshot) => {
                info!(
                    "{}: {} price point(s), {}",
                    self.oracle.name(),
                    snapshot.points.len(),
                    snapshot.stats.headline()
                );
                self.succeeded.store(true, Ordering::Release);
                WidgetState::Ready(snapshot)
            }
            Err(e) => {
                warn!("{}: acquire failed: {e}", self.oracle.name());
                WidgetState::Error(e.to_string())
            }
        };
        self.state.send_replace(next);
    }

    /// Start polling: one cycle immediately, then every [`REFRESH_INTERVAL`].
    /// Polling stops when the returned handle is stopped or dropped.
    pub fn activate(self) -> ActiveWidget {
        self.activate_every(REFRESH_INTERVAL)
    }

    /// Like [`activate`](Self::activate) with a custom period.
    pub fn activate_every(self, period: Duration) -> ActiveWidget {
        let state = self.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            // A slow cycle delays the next tick instead of causing a burst.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.refresh().await;
            }
        });
        ActiveWidget { task, state }
    }
}

/// Handle to a polling widget. Owns the timer task; dropping it aborts the
/// task together with any request still in flight.
pub struct ActiveWidget {
    task: JoinHandle<()>,
    state: watch::Receiver<WidgetState>,
}

impl ActiveWidget {
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ActiveWidget {
    fn drop(&mut self) {
        self.task.abort();
    }
}
