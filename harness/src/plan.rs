use serde::Serialize;

use crate::{BenchError, BenchResult};

/// Static division of the total operation count across workers.
///
/// Every worker gets `total_operations / worker_count` operations. The
/// remainder is not redistributed: a run of 1000 operations over 3 workers
/// performs 999.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WorkPlan {
    total_operations: u64,
    worker_count: usize,
    per_worker_operations: u64,
}

impl WorkPlan {
    pub fn new(total_operations: u64, worker_count: usize) -> BenchResult<Self> {
        if worker_count == 0 {
            return Err(BenchError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }

        Ok(Self {
            total_operations,
            worker_count,
            per_worker_operations: total_operations / worker_count as u64,
        })
    }

    pub fn total_operations(&self) -> u64 {
        self.total_operations
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn per_worker_operations(&self) -> u64 {
        self.per_worker_operations
    }

    /// Operations the workers will actually attempt.
    pub fn planned_operations(&self) -> u64 {
        self.per_worker_operations * self.worker_count as u64
    }

    /// `total_operations mod worker_count`: requested but never attempted.
    pub fn dropped_operations(&self) -> u64 {
        self.total_operations - self.planned_operations()
    }
}
