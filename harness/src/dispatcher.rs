use std::sync::Arc;

use store::{RecordShape, StoreConnector};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info};

use common::logger::worker_span;

use crate::BenchResult;
use crate::metrics::counters::Counters;
use crate::plan::WorkPlan;
use crate::worker::{Worker, WorkerOutcome};

/// Starts one worker per planned slot and waits for all of them.
///
/// Work is assigned statically: there is no shared queue, so assignment needs
/// no coordination. A slow worker delays the end of the run but not the others.
pub struct Dispatcher {
    connector: Arc<dyn StoreConnector>,
    shape: RecordShape,
    counters: Counters,
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn StoreConnector>, shape: RecordShape, counters: Counters) -> Self {
        Self {
            connector,
            shape,
            counters,
        }
    }

    /// Runs the plan to completion.
    ///
    /// Returns the per-worker outcomes ordered by worker id. The only error is
    /// a fatal worker condition (connect failure or a worker task that did not
    /// finish); the remaining workers are then aborted and awaited before the
    /// error is returned, so no worker outlives this call.
    pub async fn run(&self, plan: &WorkPlan) -> BenchResult<Vec<WorkerOutcome>> {
        let mut workers = JoinSet::new();

        for id in 0..plan.worker_count() {
            let worker = Worker::new(
                id,
                plan.per_worker_operations(),
                Arc::clone(&self.connector),
                self.shape.clone(),
                self.counters.clone(),
            );
            workers.spawn(worker.run().instrument(worker_span(id)));
        }

        info!(
            workers = plan.worker_count(),
            per_worker = plan.per_worker_operations(),
            "workers started"
        );

        let mut outcomes = Vec::with_capacity(plan.worker_count());

        while let Some(joined) = workers.join_next().await {
            let fatal = match joined {
                Ok(Ok(outcome)) => {
                    outcomes.push(outcome);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(join_err) => join_err.into(),
            };

            error!(error = %fatal, "fatal worker error, aborting run");
            workers.shutdown().await;
            return Err(fatal);
        }

        outcomes.sort_by_key(|o| o.worker_id);
        Ok(outcomes)
    }
}
