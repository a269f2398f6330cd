//! Self-telemetry for loads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::counter;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

/// Receives load statistics. Calls must be cheap and never fail.
pub trait Reporter: Send + Sync {
    fn incr_rows_pushed(&self, rows: u64);
    fn incr_rows_failed(&self, rows: u64);
    fn incr_bytes_sent(&self, bytes: u64);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn incr_rows_pushed(&self, _rows: u64) {}
    fn incr_rows_failed(&self, _rows: u64) {}
    fn incr_bytes_sent(&self, _bytes: u64) {}
}

/// Point-in-time totals of a [`ProgressReporter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub rows_pushed: u64,
    pub rows_failed: u64,
    pub bytes_sent: u64,
}

/// Counts loaded rows and bytes, mirrors them into `metrics` counters and
/// periodically logs throughput.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    rows_pushed: AtomicU64,
    rows_failed: AtomicU64,
    bytes_sent: AtomicU64,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            rows_pushed: self.rows_pushed.load(Ordering::Relaxed),
            rows_failed: self.rows_failed.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
        }
    }

    /// Log totals and rates every `interval` until `shutdown` flips to true
    /// or its sender is dropped.
    pub async fn report(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "Starting progress reporter");

        let started = Instant::now();
        let mut ticker = time::interval_at(started + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = self.snapshot();
        let mut last_at = started;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutting down progress reporter");
                        break;
                    }
                    continue;
                }
            }

            let now = Instant::now();
            let current = self.snapshot();
            let total_secs = now.duration_since(started).as_secs_f64();
            let last_secs = now.duration_since(last_at).as_secs_f64();

            info!(
                total_mb = current.bytes_sent / 1024 / 1024,
                total_rows = current.rows_pushed,
                failed_rows = current.rows_failed,
                total_speed_mbps = rate(current.bytes_sent, total_secs) / 1024.0 / 1024.0,
                total_speed_rps = rate(current.rows_pushed, total_secs),
                last_seconds = last_secs,
                last_speed_mbps =
                    rate(current.bytes_sent - last.bytes_sent, last_secs) / 1024.0 / 1024.0,
                last_speed_rps = rate(current.rows_pushed - last.rows_pushed, last_secs),
                "Doris load progress"
            );

            last = current;
            last_at = now;
        }
    }
}

fn rate(amount: u64, secs: f64) -> f64 {
    if secs > 0.0 {
        amount as f64 / secs
    } else {
        0.0
    }
}

impl Reporter for ProgressReporter {
    fn incr_rows_pushed(&self, rows: u64) {
        self.rows_pushed.fetch_add(rows, Ordering::Relaxed);
        counter!("doris.rows.pushed", rows);
    }

    fn incr_rows_failed(&self, rows: u64) {
        self.rows_failed.fetch_add(rows, Ordering::Relaxed);
        counter!("doris.rows.failed", rows);
    }

    fn incr_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
        counter!("doris.bytes.sent", bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_accumulate() {
        let reporter = ProgressReporter::new();
        reporter.incr_rows_pushed(10);
        reporter.incr_rows_pushed(5);
        reporter.incr_rows_failed(2);
        reporter.incr_bytes_sent(4096);

        assert_eq!(
            reporter.snapshot(),
            ProgressSnapshot {
                rows_pushed: 15,
                rows_failed: 2,
                bytes_sent: 4096,
            }
        );
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(100, 4.0), 25.0);
        assert_eq!(rate(100, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_report_stops_on_shutdown() {
        let reporter = Arc::new(ProgressReporter::new());
        let (tx, rx) = watch::channel(false);

        let task = {
            let reporter = Arc::clone(&reporter);
            tokio::spawn(async move { reporter.report(Duration::from_millis(10), rx).await })
        };

        reporter.incr_rows_pushed(3);
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("reporter should stop")
            .unwrap();
    }
}
