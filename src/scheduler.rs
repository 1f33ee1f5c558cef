//! Fixed-period collection scheduler.
//!
//! Runs collect-then-publish cycles back to back with a drift-corrected
//! sleep in between. Wake-ups are phase-locked to multiples of the period
//! from the scheduler's start, measured on the monotonic clock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::collector::{DeviceClient, MetricSpec, collect};
use crate::storage::{PublishResult, StoreClient, publish};

/// Default cycle period (20 seconds).
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(20);

/// Minimum allowed period (1 second).
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Time to sleep after a cycle so the next one starts on a period boundary.
///
/// `elapsed` is measured from the scheduler's anchor. The result is
/// `period - (elapsed mod period)`: never negative, at most `period`, and
/// shorter than `period` when a cycle overran.
///
/// ```
/// use std::time::Duration;
/// use fritz_influx::scheduler::next_sleep;
///
/// let period = Duration::from_secs(20);
/// assert_eq!(next_sleep(Duration::from_secs(3), period), Duration::from_secs(17));
/// assert_eq!(next_sleep(Duration::from_secs(25), period), Duration::from_secs(15));
/// ```
pub fn next_sleep(elapsed: Duration, period: Duration) -> Duration {
    let period_nanos = period.as_nanos();
    if period_nanos == 0 {
        return Duration::ZERO;
    }
    let into_period = elapsed.as_nanos() % period_nanos;
    let remaining = period_nanos - into_period;
    // remaining <= period, which came from a Duration
    Duration::from_nanos(u64::try_from(remaining).unwrap_or(u64::MAX))
}

/// Drives collection and publishing at a fixed cadence.
pub struct Scheduler {
    period: Duration,
    specs: Vec<MetricSpec>,
    device: Arc<dyn DeviceClient>,
    store: Arc<dyn StoreClient>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("period", &self.period)
            .field("specs", &self.specs.len())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler.
    ///
    /// Period is clamped to a minimum of 1 second.
    pub fn new(
        period: Duration,
        specs: Vec<MetricSpec>,
        device: Arc<dyn DeviceClient>,
        store: Arc<dyn StoreClient>,
    ) -> Self {
        let period = if period < MIN_PERIOD {
            tracing::warn!(min_period = ?MIN_PERIOD,
                "Period is less than minimum allowed. Using minimum period."
            );
            MIN_PERIOD
        } else {
            period
        };

        Self {
            period,
            specs,
            device,
            store,
        }
    }

    /// Effective period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one collect-then-publish cycle.
    pub async fn run_cycle(&self) -> PublishResult {
        let batch = collect(&self.specs, self.device.as_ref()).await;
        publish(&batch, self.store.as_ref()).await
    }

    /// Run cycles forever.
    pub async fn run(&self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Run cycles until `shutdown` resolves.
    ///
    /// An in-flight cycle is abandoned when the shutdown fires. Returns the
    /// number of completed cycles.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let anchor = Instant::now();
        let mut cycles = 0u64;
        tracing::info!(period = ?self.period, specs = self.specs.len(), "Scheduler started");

        loop {
            let cycle_start = Instant::now();
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.run_cycle() => {}
            }
            cycles += 1;

            let duration = cycle_start.elapsed();
            let sleep = next_sleep(anchor.elapsed(), self.period);
            if duration > self.period {
                tracing::warn!(?duration, period = ?self.period, "Cycle overran its period");
            }
            tracing::debug!(
                cycle = cycles,
                duration_ms = duration.as_millis(),
                sleep_ms = sleep.as_millis(),
                "Cycle finished"
            );

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }

        tracing::info!(cycles, "Scheduler stopped");
        cycles
    }
}
