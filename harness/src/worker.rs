//! A single insert worker.
//!
//! The loop is straight-line: connect once, then perform the assigned number
//! of attempts. Every attempt bumps exactly one of the shared counters. Insert
//! errors are logged and counted; the worker never retries or backs off.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use store::{RecordShape, StoreConnector, TargetStore};
use tracing::{debug, warn};

use crate::metrics::counters::Counters;
use crate::{BenchError, BenchResult};

/// What one worker did, tallied locally alongside the shared counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorkerOutcome {
    pub worker_id: usize,
    pub completed: u64,
    pub failed: u64,
}

impl WorkerOutcome {
    pub fn attempts(&self) -> u64 {
        self.completed + self.failed
    }
}

pub struct Worker {
    id: usize,
    operations: u64,
    connector: Arc<dyn StoreConnector>,
    shape: RecordShape,
    counters: Counters,
}

impl Worker {
    pub fn new(
        id: usize,
        operations: u64,
        connector: Arc<dyn StoreConnector>,
        shape: RecordShape,
        counters: Counters,
    ) -> Self {
        Self {
            id,
            operations,
            connector,
            shape,
            counters,
        }
    }

    /// Opens this worker's own connection and runs the assigned attempts.
    ///
    /// A failed connect is fatal for the whole run and is returned as
    /// [`BenchError::WorkerConnect`]; nothing is counted in that case.
    pub async fn run(self) -> BenchResult<WorkerOutcome> {
        let store = self
            .connector
            .connect()
            .await
            .map_err(|source| BenchError::WorkerConnect {
                worker_id: self.id,
                source,
            })?;

        debug!(worker_id = self.id, operations = self.operations, "worker started");

        let outcome = self.run_on(store.as_ref()).await;

        debug!(
            worker_id = outcome.worker_id,
            completed = outcome.completed,
            failed = outcome.failed,
            "worker finished"
        );

        Ok(outcome)
    }

    async fn run_on(&self, store: &dyn TargetStore) -> WorkerOutcome {
        let mut rng = StdRng::from_entropy();
        let mut outcome = WorkerOutcome {
            worker_id: self.id,
            ..Default::default()
        };

        for attempt in 0..self.operations {
            // one value per record, shared by all of its fields
            let record = self.shape.build(rng.r#gen::<i64>());

            match store.insert_one(&record).await {
                Ok(()) => {
                    self.counters.increment_completed();
                    outcome.completed += 1;
                }
                Err(e) => {
                    warn!(worker_id = self.id, attempt, error = %e, "insert failed");
                    self.counters.increment_failed();
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}
