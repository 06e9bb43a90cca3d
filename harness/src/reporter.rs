//! Periodic throughput / error statistics.
//!
//! The reporter owns its timer loop and a stop channel. The stop flag is read
//! once per tick after the report is emitted, so a stop requested mid-interval
//! is observed only when that interval ends: exactly one more report follows
//! the request, carrying the final totals.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::metrics::counters::{CounterSnapshot, Counters};

/// Receives every report, in tick order, on the reporter task.
pub type ReportHandler = Arc<dyn Fn(&StatsReport) + Send + Sync>;

/// One statistics line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub tick: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub completed_delta: u64,
    pub failed_delta: u64,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total ops: {}, errors: {}, ops/sec: {}, errors/sec: {}",
            self.total_completed, self.total_failed, self.completed_delta, self.failed_delta
        )
    }
}

/// Counter values seen at the previous tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSample {
    completed_at_last_tick: u64,
    failed_at_last_tick: u64,
}

impl StatsSample {
    /// Builds the report for `now` and makes `now` the new baseline.
    pub fn advance(&mut self, tick: u64, now: CounterSnapshot) -> StatsReport {
        // counters never decrease; saturate anyway so a bad snapshot cannot wrap
        let report = StatsReport {
            tick,
            total_completed: now.completed,
            total_failed: now.failed,
            completed_delta: now.completed.saturating_sub(self.completed_at_last_tick),
            failed_delta: now.failed.saturating_sub(self.failed_at_last_tick),
        };

        self.completed_at_last_tick = now.completed;
        self.failed_at_last_tick = now.failed;

        report
    }
}

/// Prints each report on its own stdout line.
pub fn stdout_handler() -> ReportHandler {
    Arc::new(|report: &StatsReport| {
        println!("{report}");
    })
}

pub struct Reporter {
    counters: Counters,
    interval: Duration,
    handler: ReportHandler,
}

impl Reporter {
    pub fn new(counters: Counters, interval: Duration, handler: ReportHandler) -> Self {
        Self {
            counters,
            interval,
            handler,
        }
    }

    /// Starts the reporter task on the current runtime.
    pub fn spawn(self) -> ReporterHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));

        ReporterHandle { stop_tx, task }
    }

    async fn run(self, stop_rx: watch::Receiver<bool>) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick of an interval completes immediately.
        ticker.tick().await;

        let mut sample = StatsSample::default();
        let mut tick = 0;

        loop {
            ticker.tick().await;
            tick += 1;

            let report = sample.advance(tick, self.counters.snapshot());
            (self.handler)(&report);

            // A dropped handle counts as a stop request.
            if *stop_rx.borrow() || stop_rx.has_changed().is_err() {
                break;
            }
        }

        debug!(ticks = tick, "reporter stopped");
        tick
    }
}

/// Owner-side handle of a running reporter.
pub struct ReporterHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl ReporterHandle {
    /// Signals the reporter and waits for it to exit.
    ///
    /// Does not interrupt the current interval. Returns the number of reports
    /// emitted over the reporter's lifetime.
    pub async fn stop(self) -> u64 {
        // send only fails when the task is already gone
        let _ = self.stop_tx.send(true);

        match self.task.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::warn!(error = %e, "reporter task ended abnormally");
                0
            }
        }
    }
}
