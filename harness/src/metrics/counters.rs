use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Completed / failed operation tally shared by every worker and the reporter.
///
/// Cloning is cheap and every clone observes the same counts. A fresh value is
/// created per run; there is no process-wide instance.
#[derive(Clone, Debug, Default)]
pub struct Counters {
    completed: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

/// Point-in-time read of [`Counters`].
///
/// The two fields are loaded independently; an increment racing the snapshot
/// may land in this one or the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub completed: u64,
    pub failed: u64,
}

impl CounterSnapshot {
    pub fn total(&self) -> u64 {
        self.completed + self.failed
    }
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::Release);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Release);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            completed: self.completed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }
}
